//! Cursor-following pagination over control-plane list endpoints.
//!
//! Every list response embeds `total_results`, `total_pages`, and `next_url`. A
//! [`PageWalker`] fetches one page per [`PageWalker::next_page`] call and follows
//! `next_url` until it is empty or absent. The walker trusts the cursor chain and never
//! cross-checks `total_results`.

// std
use std::marker::PhantomData;
// self
use crate::{
	_prelude::*,
	client::JsonClient,
	http::{HttpTransport, ReqwestTransport},
};

/// Page size requested from every paged endpoint.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// One page of a list response.
#[derive(Clone, Debug, Deserialize)]
pub struct Page<R> {
	/// Total number of resources across all pages.
	#[serde(default)]
	pub total_results: u64,
	/// Total number of pages.
	#[serde(default)]
	pub total_pages: u64,
	/// Path of the next page; `None` or empty on the last page.
	#[serde(default)]
	pub next_url: Option<String>,
	/// Resources on this page.
	#[serde(default = "Vec::new")]
	pub resources: Vec<R>,
}
impl<R> Page<R> {
	/// Returns the cursor of the next page, treating an empty string as the end.
	pub fn next_cursor(&self) -> Option<&str> {
		self.next_url.as_deref().filter(|next| !next.is_empty())
	}
}

/// Lazy, restartable walker yielding one page per request.
pub struct PageWalker<'a, R, T = ReqwestTransport>
where
	T: ?Sized + HttpTransport,
{
	client: &'a JsonClient<T>,
	start: String,
	cursor: Option<String>,
	_resource: PhantomData<fn() -> R>,
}
impl<'a, R, T> PageWalker<'a, R, T>
where
	R: DeserializeOwned,
	T: ?Sized + HttpTransport,
{
	/// Creates a walker starting at `start`.
	pub fn new(client: &'a JsonClient<T>, start: impl Into<String>) -> Self {
		let start = start.into();

		Self { client, cursor: Some(start.clone()), start, _resource: PhantomData }
	}

	/// Fetches the next page, or returns `None` once the cursor chain is exhausted.
	pub async fn next_page(&mut self) -> Result<Option<Page<R>>> {
		let Some(path) = self.cursor.take() else {
			return Ok(None);
		};
		let page: Page<R> = self.client.get(&path).await?;

		self.cursor = page.next_cursor().map(ToOwned::to_owned);

		Ok(Some(page))
	}

	/// Returns `true` once the last page has been fetched.
	pub fn is_exhausted(&self) -> bool {
		self.cursor.is_none()
	}

	/// Restarts the walk from the first page.
	pub fn rewind(&mut self) {
		self.cursor = Some(self.start.clone());
	}

	/// Walks every remaining page and concatenates their resources in page order.
	pub async fn collect_all(mut self) -> Result<Vec<R>> {
		let mut resources = Vec::new();

		while let Some(page) = self.next_page().await? {
			resources.extend(page.resources);
		}

		Ok(resources)
	}

	/// Walks pages until `f` returns `Some`, skipping any pages after the match.
	pub async fn find_map<U, F>(mut self, mut f: F) -> Result<Option<U>>
	where
		F: FnMut(R) -> Option<U>,
	{
		while let Some(page) = self.next_page().await? {
			if let Some(found) = page.resources.into_iter().find_map(&mut f) {
				return Ok(Some(found));
			}
		}

		Ok(None)
	}
}
impl<R, T> Debug for PageWalker<'_, R, T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PageWalker")
			.field("start", &self.start)
			.field("cursor", &self.cursor)
			.finish()
	}
}

impl<T> JsonClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Starts a lazy walk at `path`.
	pub fn walk<R>(&self, path: impl Into<String>) -> PageWalker<'_, R, T>
	where
		R: DeserializeOwned,
	{
		PageWalker::new(self, path)
	}

	/// Walks every page starting at `path` and returns all resources.
	pub async fn get_all<R>(&self, path: impl Into<String>) -> Result<Vec<R>>
	where
		R: DeserializeOwned,
	{
		self.walk(path).collect_all().await
	}
}
