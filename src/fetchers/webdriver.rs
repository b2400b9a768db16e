use crate::errors::FetchError;
use crate::fetchers::Fetch;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// Driver URLs tried when the configured one does not answer
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Fetches pages through a real browser driven over WebDriver.
///
/// The browser session is opened lazily on the first fetch and reused.
/// Pages that only exist after scripts ran are seen as the browser sees
/// them. WebDriver does not expose response statuses, so only navigation
/// errors and timeouts count as failures.
pub struct WebDriverFetcher {
    webdriver_url: String,
    page_timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: impl Into<String>, page_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            page_timeout,
            client: Mutex::new(None),
        }
    }

    /// End the browser session, if one was opened
    pub async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }

    async fn load(&self, client: &Client, url: &Url) -> Result<String, CmdError> {
        client.goto(url.as_str()).await?;
        client.source().await
    }
}

#[async_trait]
impl Fetch for WebDriverFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        // One browser session renders one page at a time
        let mut slot = self.client.lock().await;

        for attempt in 0..2 {
            let existing = if attempt == 0 { slot.clone() } else { None };
            let client = match existing {
                Some(client) => client,
                None => {
                    if attempt > 0 {
                        ::log::warn!("Attempting to reconnect WebDriver session");
                    }
                    let client = connect_to_webdriver(&self.webdriver_url)
                        .await
                        .ok_or_else(|| {
                            FetchError::Unavailable(format!(
                                "no WebDriver server answered at {} or the fallback URLs",
                                self.webdriver_url
                            ))
                        })?;
                    *slot = Some(client.clone());
                    client
                }
            };

            ::log::debug!("WebDriver loading {}", url);
            match timeout(self.page_timeout, self.load(&client, url)).await {
                Ok(Ok(source)) => {
                    ::log::trace!("WebDriver returned {} bytes for {}", source.len(), url);
                    return Ok(source);
                }
                Ok(Err(e)) if attempt == 0 && is_session_lost(&e) => {
                    ::log::warn!("Lost WebDriver session while loading {}", url);
                    continue;
                }
                Ok(Err(e)) => {
                    ::log::error!("Failed to load {}: {}", url, e);
                    return Err(FetchError::Transport {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                }
                Err(_) => {
                    ::log::error!("Timeout loading: {}", url);
                    return Err(FetchError::Timeout { url: url.clone() });
                }
            }
        }

        Err(FetchError::Unavailable(
            "WebDriver session could not be re-established".to_string(),
        ))
    }

    async fn shutdown(&self) {
        self.close().await;
    }
}

fn is_session_lost(error: &CmdError) -> bool {
    error.to_string().contains("Unable to find session")
        || error.to_string().contains("invalid session id")
}

/// Connects to the WebDriver instance, trying well-known ports if needed
async fn connect_to_webdriver(webdriver_url: &str) -> Option<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Some(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Some(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    None
}
