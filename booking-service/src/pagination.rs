use serde::{Deserialize, Serialize};

const DEFAULT_SIZE: i64 = 20;
const MAX_SIZE: i64 = 100;

/// `?page=` / `?size=` query parameters. Page numbers are 0-based; size is
/// clamped to keep a single request from dragging the whole table over.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_size() -> i64 {
    DEFAULT_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        PageParams {
            page: 0,
            size: DEFAULT_SIZE,
        }
    }
}

impl PageParams {
    pub fn limit(&self) -> i64 {
        self.size.clamp(1, MAX_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.page.max(0) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        Page {
            items,
            page: params.page.max(0),
            size: params.limit(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let params = PageParams::default();
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn size_is_clamped() {
        let params = PageParams { page: 0, size: 5000 };
        assert_eq!(params.limit(), 100);
        let params = PageParams { page: 0, size: 0 };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn offset_follows_page() {
        let params = PageParams { page: 3, size: 25 };
        assert_eq!(params.offset(), 75);
        let params = PageParams { page: -1, size: 25 };
        assert_eq!(params.offset(), 0);
    }
}
