use gloo_net::http::Request;
use runtime::{EventLoop, Promise, deferred};
use viewport::{TemplateError, TemplateLoader};
use wasm_bindgen_futures::spawn_local;

/// Loads templates over HTTP and settles them on the viewer's event loop.
#[derive(Debug, Clone)]
pub struct FetchTemplateLoader {
    event_loop: EventLoop,
}

impl FetchTemplateLoader {
    pub fn new(event_loop: &EventLoop) -> Self {
        Self {
            event_loop: event_loop.clone(),
        }
    }
}

impl TemplateLoader for FetchTemplateLoader {
    fn load(&self, url: &str) -> Promise<String, TemplateError> {
        let (d, promise) = deferred(&self.event_loop);
        let event_loop = self.event_loop.clone();
        let url = url.to_string();
        spawn_local(async move {
            let _ = d.settle(fetch_text(&url).await);
            event_loop.run_until_idle();
        });
        promise
    }
}

async fn fetch_text(url: &str) -> Result<String, TemplateError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| TemplateError::Network(e.to_string()))?;
    match resp.status() {
        200..=299 => {}
        404 => return Err(TemplateError::NotFound(url.to_string())),
        status => {
            return Err(TemplateError::Http {
                url: url.to_string(),
                status,
            });
        }
    }
    resp.text()
        .await
        .map_err(|e| TemplateError::Network(e.to_string()))
}
