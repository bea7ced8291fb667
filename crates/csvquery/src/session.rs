use std::io::Write;
use std::path::Path;

use cq_expr::{ExprError, FilterStats, filter_rows, filter_rows_with_stats};
use cq_frame::{Dataset, FrameError, LoadError, Page, SortKey, TypedRow, paginate, sort_rows};
use cq_io::{IoError, RawTable, read_csv_path, read_csv_str, write_csv};
use cq_runtime::QueryPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No CSV data loaded")]
    NoData,
    #[error("File is too large: {size} bytes exceeds the {limit} byte upload limit")]
    UploadTooLarge { size: u64, limit: u64 },
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// One page request against the loaded dataset. `page` is zero-based and a
/// missing `size` takes the policy default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewRequest {
    pub filter: String,
    pub sort: Option<SortKey>,
    pub page: usize,
    pub size: Option<usize>,
}

impl ViewRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    #[must_use]
    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    #[must_use]
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub headers: Vec<String>,
    pub page: Page<TypedRow>,
    pub total_pages: usize,
    pub stats: FilterStats,
}

/// Per-user state: at most one dataset, replaced wholesale on each load.
#[derive(Debug, Clone, Default)]
pub struct Session {
    policy: QueryPolicy,
    dataset: Option<Dataset>,
}

impl Session {
    #[must_use]
    pub fn new(policy: QueryPolicy) -> Self {
        Self {
            policy,
            dataset: None,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &QueryPolicy {
        &self.policy
    }

    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.dataset.is_some()
    }

    /// Headers of the loaded dataset in file order; empty when nothing is loaded.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        self.dataset
            .as_ref()
            .map(Dataset::headers)
            .unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.dataset = None;
    }

    pub fn load_csv_str(&mut self, input: &str) -> Result<&Dataset, SessionError> {
        self.check_upload_size(input.len() as u64)?;
        self.load_table(read_csv_str(input)?)
    }

    pub fn load_csv_path(&mut self, path: impl AsRef<Path>) -> Result<&Dataset, SessionError> {
        let path = path.as_ref();
        let size = std::fs::metadata(path).map_err(IoError::from)?.len();
        self.check_upload_size(size)?;
        self.load_table(read_csv_path(path)?)
    }

    /// Type and store `table`. The previous dataset is only replaced once the
    /// new one has loaded; a failed load leaves the session untouched.
    pub fn load_table(&mut self, table: RawTable) -> Result<&Dataset, SessionError> {
        let dataset = Dataset::load(
            &table.headers,
            &table.rows,
            self.policy.inference_sample_rows,
        )?;
        Ok(self.dataset.insert(dataset))
    }

    /// Filter, then sort, then slice one page. A sort key naming a column the
    /// dataset does not have is ignored.
    pub fn view(&self, request: &ViewRequest) -> Result<View, SessionError> {
        let dataset = self.loaded()?;
        let (filtered, stats) = filter_rows_with_stats(
            dataset.rows(),
            dataset.schema(),
            &request.filter,
            &self.policy,
        )?;

        let sort = request
            .sort
            .as_ref()
            .filter(|key| dataset.schema().contains(&key.column));
        #[cfg(feature = "tracing")]
        {
            if let (None, Some(key)) = (sort, request.sort.as_ref()) {
                tracing::debug!(column = %key.column, "ignoring sort on unknown column");
            }
        }
        let sorted = sort_rows(filtered, sort, dataset.schema());

        let page_size = self.policy.page_size(request.size);
        let page = paginate(&sorted, request.page, page_size)?.map(TypedRow::clone);

        Ok(View {
            headers: dataset.headers().to_vec(),
            total_pages: page.total_pages(),
            page,
            stats,
        })
    }

    /// Write the rows matching `filter` as CSV, in load order and header
    /// order. Returns the number of rows written.
    pub fn export<W: Write>(&self, filter: &str, sink: W) -> Result<usize, SessionError> {
        let dataset = self.loaded()?;
        let rows = filter_rows(dataset.rows(), dataset.schema(), filter, &self.policy)?;
        Ok(write_csv(sink, dataset.headers(), rows)?)
    }

    fn loaded(&self) -> Result<&Dataset, SessionError> {
        self.dataset.as_ref().ok_or(SessionError::NoData)
    }

    fn check_upload_size(&self, size: u64) -> Result<(), SessionError> {
        let limit = self.policy.max_upload_bytes;
        if size > limit {
            return Err(SessionError::UploadTooLarge { size, limit });
        }
        Ok(())
    }
}
