//! Widget descriptors held by the bridge.

use crate::target::FetchKind;
use sdrflow_core::{BlockId, BlockParameter};
use serde::Serialize;

/// Address value meaning "the in-process flowgraph".
pub const LOCAL_URL: &str = "local";

/// Whether `url` addresses the in-process flowgraph.
pub fn is_local(url: &str) -> bool {
    url.is_empty() || url == LOCAL_URL
}

/// What a widget drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetKind {
    /// Integer slider bound to one block parameter.
    Slider {
        /// Target block.
        block: BlockId,
        /// Parameter index within the block.
        index: usize,
    },
    /// Frequency or time picker that requests data.
    Picker {
        /// What the picker fetches.
        fetch: FetchKind,
    },
}

/// A registered widget: its range, current value and target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    url: String,
    kind: WidgetKind,
    param: BlockParameter,
}

impl Widget {
    pub(crate) fn new(url: String, kind: WidgetKind, param: BlockParameter) -> Self {
        Self { url, kind, param }
    }

    /// Widget id.
    pub fn id(&self) -> &str {
        self.param.id()
    }

    /// Endpoint address; empty or [`LOCAL_URL`] for the local flowgraph.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Target description.
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// Range, grid and current value.
    pub fn param(&self) -> &BlockParameter {
        &self.param
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.param.value()
    }

    /// Whether changes go to the in-process flowgraph.
    pub fn is_local(&self) -> bool {
        is_local(&self.url)
    }

    pub(crate) fn param_mut(&mut self) -> &mut BlockParameter {
        &mut self.param
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_urls() {
        assert!(is_local(""));
        assert!(is_local(LOCAL_URL));
        assert!(!is_local("ws://127.0.0.1:1337/api/fg/0"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let widget = Widget::new(
            String::new(),
            WidgetKind::Slider {
                block: BlockId::FRONTEND,
                index: 2,
            },
            BlockParameter::new("lna", 0.0, 40.0, 8.0, 32.0).unwrap(),
        );
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["kind"]["kind"], "slider");
        assert_eq!(json["kind"]["index"], 2);
        assert_eq!(json["param"]["value"], 32.0);
    }
}
