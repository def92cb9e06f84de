use super::console;
use crate::config::BrowserConfig;
use crate::Result;
use eoka::{Browser, Page};
use tracing::debug;

/// A launched browser with a single page.
///
/// Owned by the runner for exactly one run; [`Session::close`] consumes it.
pub struct Session {
    browser: Browser,
    page: Page,
}

impl Session {
    /// Launch a browser and open a blank page with the console observer
    /// registered, so it is in place before the first real navigation.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let viewport = config.viewport.unwrap_or_default();
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            ..Default::default()
        };

        debug!(
            "Launching browser (headless: {}, viewport: {}x{})",
            config.headless, viewport.width, viewport.height
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                return Err(e.into());
            }
        };
        console::register(&page).await;

        Ok(Self { browser, page })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Close the browser.
    pub async fn close(self) -> Result<()> {
        debug!("Closing browser");
        self.browser.close().await?;
        Ok(())
    }
}
