//! Filtered, paginated search over workflow instances.

use crate::domain::workflow_definition::WorkflowType;
use crate::domain::workflow_instance::{CorrelationId, WorkflowInstance};
use crate::CoreError;
use serde::{Deserialize, Serialize};

/// Page size used when a request does not name one
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Conjunctive instance filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSearchFilter {
    /// Exact workflow type
    #[serde(default, rename = "type")]
    pub workflow_type: Option<WorkflowType>,

    /// Exact correlation id
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,

    /// Exact current state
    #[serde(default)]
    pub state: Option<String>,

    /// Exact assignee
    #[serde(default)]
    pub assignee: Option<String>,

    /// Case-insensitive substring of type, correlation id, state or assignee
    #[serde(default)]
    pub search_text: Option<String>,
}

impl WorkflowSearchFilter {
    /// Restrict to a workflow type
    pub fn with_type(mut self, workflow_type: impl Into<String>) -> Self {
        self.workflow_type = Some(WorkflowType::new(workflow_type));
        self
    }

    /// Restrict to a correlation id
    pub fn with_correlation_id(mut self, correlation_id: impl Into<CorrelationId>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Restrict to a current state
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Restrict to an assignee
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Free-text search
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Check an instance against every set criterion
    pub fn matches(&self, instance: &WorkflowInstance) -> bool {
        if let Some(workflow_type) = &self.workflow_type {
            if instance.workflow_type != *workflow_type {
                return false;
            }
        }

        if let Some(correlation_id) = &self.correlation_id {
            if instance.correlation_id != *correlation_id {
                return false;
            }
        }

        if let Some(state) = &self.state {
            if instance.state != *state {
                return false;
            }
        }

        if let Some(assignee) = &self.assignee {
            if instance.assignee.as_deref() != Some(assignee.as_str()) {
                return false;
            }
        }

        match self.search_text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                [
                    Some(instance.workflow_type.as_str()),
                    Some(instance.correlation_id.as_str()),
                    Some(instance.state.as_str()),
                    instance.assignee.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index
    #[serde(default)]
    pub page_index: u32,

    /// Items per page; must be positive
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a page request
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// Reject a zero page size
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_size == 0 {
            return Err(CoreError::ValidationError(
                "Page size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Index of the first item of this page in the full result
    #[inline]
    pub fn offset(&self) -> usize {
        self.page_index as usize * self.page_size as usize
    }
}

/// One page of an ordered result, with the metadata a transport needs for paging headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items of this page, in result order
    pub items: Vec<T>,

    /// Number of matching items before slicing
    pub total_count: u64,

    /// Zero-based index of this page
    pub page_index: u32,

    /// Requested page size
    pub page_size: u32,

    /// `ceil(total_count / page_size)`
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Slice an already filtered and ordered result.
    ///
    /// A page past the end yields no items but keeps the full `total_count`.
    pub fn from_ordered(items: Vec<T>, request: &PageRequest) -> Result<Self, CoreError> {
        request.validate()?;

        let total_count = items.len() as u64;
        let items: Vec<T> = items
            .into_iter()
            .skip(request.offset())
            .take(request.page_size as usize)
            .collect();

        Ok(Self {
            items,
            total_count,
            page_index: request.page_index,
            page_size: request.page_size,
            total_pages: total_count.div_ceil(u64::from(request.page_size)),
        })
    }

    /// Convert items without touching the page metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_index: self.page_index,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }

    /// Whether a later page exists
    #[inline]
    pub fn has_next(&self) -> bool {
        u64::from(self.page_index) + 1 < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow_instance::WorkflowInstanceId;
    use chrono::Utc;

    fn instance(id: u64, workflow_type: &str, state: &str, assignee: Option<&str>) -> WorkflowInstance {
        WorkflowInstance {
            id: WorkflowInstanceId(id),
            workflow_type: WorkflowType::new(workflow_type),
            correlation_id: CorrelationId::new(format!("c-{}", id)),
            state: state.to_string(),
            assignee: assignee.map(str::to_string),
            started: Utc::now(),
            completed: None,
        }
    }

    #[test]
    fn test_page_math() {
        let cases = [(0u64, 10u32, 0u64), (1, 10, 1), (10, 10, 1), (11, 10, 2), (25, 5, 5)];
        for (total, size, pages) in cases {
            let items: Vec<u64> = (0..total).collect();
            let page = Page::from_ordered(items, &PageRequest::new(0, size)).unwrap();
            assert_eq!(page.total_count, total);
            assert_eq!(page.total_pages, pages, "total {} size {}", total, size);
        }
    }

    #[test]
    fn test_slicing() {
        let items: Vec<u32> = (0..23).collect();

        let page = Page::from_ordered(items.clone(), &PageRequest::new(2, 10)).unwrap();
        assert_eq!(page.items, vec![20, 21, 22]);
        assert!(!page.has_next());

        let page = Page::from_ordered(items, &PageRequest::new(1, 10)).unwrap();
        assert_eq!(page.items.first(), Some(&10));
        assert_eq!(page.items.len(), 10);
        assert!(page.has_next());
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items: Vec<u32> = (0..5).collect();
        let page = Page::from_ordered(items, &PageRequest::new(7, 2)).unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = Page::from_ordered(vec![1, 2, 3], &PageRequest::new(0, 0)).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::from_ordered(vec![1, 2, 3], &PageRequest::new(1, 2)).unwrap();
        let mapped = page.clone().map(|n| n.to_string());

        assert_eq!(mapped.items, vec!["3".to_string()]);
        assert_eq!(mapped.total_pages, page.total_pages);
        assert_eq!(mapped.total_count, 3);
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let paid = instance(1, "Order", "Paid", Some("alice"));
        let filter = WorkflowSearchFilter::default()
            .with_type("Order")
            .with_state("Paid");
        assert!(filter.matches(&paid));

        let filter = filter.with_assignee("bob");
        assert!(!filter.matches(&paid));
    }

    #[test]
    fn test_filter_type_is_case_sensitive() {
        let order = instance(1, "Order", "New", None);
        assert!(!WorkflowSearchFilter::default().with_type("order").matches(&order));
    }

    #[test]
    fn test_search_text() {
        let order = instance(7, "Order", "Shipped", Some("Alice"));

        assert!(WorkflowSearchFilter::default().with_search_text("ship").matches(&order));
        assert!(WorkflowSearchFilter::default().with_search_text("ALICE").matches(&order));
        assert!(WorkflowSearchFilter::default().with_search_text("c-7").matches(&order));
        assert!(WorkflowSearchFilter::default().with_search_text("  ").matches(&order));
        assert!(!WorkflowSearchFilter::default().with_search_text("invoice").matches(&order));
    }

    #[test]
    fn test_page_request_defaults_from_json() {
        let request: PageRequest = serde_json::from_str(r#"{"page_index": 3}"#).unwrap();
        assert_eq!(request, PageRequest::new(3, DEFAULT_PAGE_SIZE));
    }
}
