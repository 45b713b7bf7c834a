//! Endpoint selection

use cvm_api::Endpoint;
use cvm_util::{CvmError, Result};
use tracing::{debug, info};

/// Ordered set of candidate endpoints with exactly one selected
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    endpoints: Vec<Endpoint>,
}

impl EndpointSelector {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }

    /// All endpoints in configuration order
    pub fn list(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Select the endpoint with `url`; unknown URLs are ignored
    pub fn select(&mut self, url: &str) {
        if !self.endpoints.iter().any(|e| e.url == url) {
            debug!(url = %url, "Ignoring selection of unknown endpoint");
            return;
        }

        for endpoint in &mut self.endpoints {
            endpoint.is_selected = endpoint.url == url;
        }

        info!(url = %url, "Endpoint selected");
    }

    /// The selected endpoint
    pub fn current(&self) -> Result<&Endpoint> {
        self.endpoints
            .iter()
            .find(|e| e.is_selected)
            .ok_or_else(|| CvmError::config("no endpoint is selected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> EndpointSelector {
        EndpointSelector::new(vec![
            Endpoint {
                url: "https://api-main.cvm.rest/".into(),
                label: "Main".into(),
                is_selected: true,
            },
            Endpoint::new("https://api-1.cvm.rest/", "1"),
            Endpoint::new("https://api-2.cvm.rest/", "2"),
        ])
    }

    fn selected_count(selector: &EndpointSelector) -> usize {
        selector.list().iter().filter(|e| e.is_selected).count()
    }

    #[test]
    fn select_known_endpoint() {
        let mut selector = selector();
        selector.select("https://api-1.cvm.rest/");

        assert_eq!(selector.current().unwrap().url, "https://api-1.cvm.rest/");
        assert_eq!(selected_count(&selector), 1);

        selector.select("https://api-2.cvm.rest/");
        assert_eq!(selector.current().unwrap().label, "2");
        assert_eq!(selected_count(&selector), 1);
    }

    #[test]
    fn select_unknown_is_noop() {
        let mut selector = selector();
        let before = selector.list().to_vec();

        selector.select("https://elsewhere.example.org/");

        assert_eq!(selector.list(), before.as_slice());
        assert_eq!(selector.current().unwrap().label, "Main");
    }

    #[test]
    fn list_keeps_order() {
        let selector = selector();
        let labels: Vec<_> = selector.list().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Main", "1", "2"]);
    }

    #[test]
    fn current_without_selection_is_configuration_error() {
        let selector = EndpointSelector::new(vec![Endpoint::new("https://a/", "A")]);
        assert!(matches!(selector.current(), Err(CvmError::Configuration(_))));
    }
}
