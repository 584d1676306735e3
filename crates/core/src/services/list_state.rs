//! Filter, page size and current page of the patient list.
//!
//! This is the synchronous half of the list orchestrator: reset rules and
//! the snapshot handed to the UI. Fetching lives in [`super::list`].

use crate::error::{DomainError, DomainResult};
use crate::models::{Patient, PatientFilter};
use crate::ports::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PatientPage};

use super::cursor_map::CursorMap;

/// Page sizes offered by the list view.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Mutable state owned by the list orchestrator.
#[derive(Debug, Clone)]
pub struct ListState {
    filter: PatientFilter,
    page_size: u32,
    current_page: u32,
    cursors: CursorMap,
    records: Vec<Patient>,
    total_count: u64,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            filter: PatientFilter::default(),
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
            cursors: CursorMap::new(),
            records: Vec::new(),
            total_count: 0,
        }
    }
}

impl ListState {
    pub fn new(page_size: u32) -> DomainResult<Self> {
        validate_page_size(page_size)?;
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn filter(&self) -> &PatientFilter {
        &self.filter
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn cursors(&self) -> &CursorMap {
        &self.cursors
    }

    pub(crate) fn cursors_mut(&mut self) -> &mut CursorMap {
        &mut self.cursors
    }

    /// Replace the filter and invalidate every cursor.
    pub fn set_filters(&mut self, filter: PatientFilter) {
        self.filter = filter.normalized();
        self.reset();
    }

    /// Change the page size and invalidate every cursor.
    ///
    /// Cursors are computed against a specific page stride, so none of them
    /// survive a size change.
    pub fn set_page_size(&mut self, page_size: u32) -> DomainResult<()> {
        validate_page_size(page_size)?;
        self.page_size = page_size;
        self.reset();
        Ok(())
    }

    /// Back to page 1 with only the start cursor known.
    ///
    /// The displayed page is dropped too: it belongs to the previous filter
    /// or page size until page 1 is fetched again.
    pub fn reset(&mut self) {
        self.cursors.reset();
        self.current_page = 1;
        self.records.clear();
        self.total_count = 0;
    }

    /// Show `data` as the content of `page`.
    pub(crate) fn show(&mut self, page: u32, data: PatientPage) {
        self.current_page = page;
        self.records = data.records;
        self.total_count = data.total_count;
    }

    /// Number of pages implied by the last known total.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    /// Snapshot for display.
    pub fn view(&self) -> ListView {
        ListView {
            records: self.records.clone(),
            filter: self.filter.clone(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages(),
        }
    }
}

/// Read-only snapshot of the list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub records: Vec<Patient>,
    pub filter: PatientFilter,
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

impl ListView {
    /// 1-based (first, last) record positions shown on this page.
    pub fn showing_range(&self) -> (u64, u64) {
        if self.records.is_empty() {
            return (0, 0);
        }
        let size = u64::from(self.page_size);
        let start = u64::from(self.current_page - 1) * size + 1;
        let end = (u64::from(self.current_page) * size).min(self.total_count);
        (start, end)
    }

    /// "Showing 11 to 20 of 25 patients".
    pub fn summary(&self) -> String {
        let (start, end) = self.showing_range();
        format!(
            "Showing {} to {} of {} patients",
            start, end, self.total_count
        )
    }
}

/// `ceil(total / page_size)`.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size)) as u32
}

fn validate_page_size(page_size: u32) -> DomainResult<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(DomainError::InvalidPageSize(page_size));
    }
    Ok(())
}
