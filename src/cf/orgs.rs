//! Organization and space lookups by name.

// self
use crate::{
	_prelude::*,
	cf::{CfClient, Organization, Space},
	http::HttpTransport,
	pagination::Page,
};

impl<T> CfClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Returns the first organization named `name`, or [`Error::ResourceNotFound`].
	pub async fn get_organization(&self, name: &str) -> Result<Organization> {
		let page: Page<Organization> =
			self.json.get(&format!("/v2/organizations?q=name:{name}")).await?;

		page.resources.into_iter().next().ok_or_else(|| Error::ResourceNotFound {
			message: format!("organization {name:?} not found"),
		})
	}

	/// Returns the first space named `name` within `organization`, or
	/// [`Error::ResourceNotFound`].
	pub async fn get_space(&self, organization: &Organization, name: &str) -> Result<Space> {
		let page: Page<Space> = self
			.json
			.get(&format!("{}?q=name:{name}", organization.entity.spaces_url))
			.await?;

		page.resources.into_iter().next().ok_or_else(|| Error::ResourceNotFound {
			message: format!("space {name:?} not found in organization {:?}", organization.entity.name),
		})
	}
}
