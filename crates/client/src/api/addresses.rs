//! Saved addresses.

use reqwest::Method;
use tracing::instrument;

use everything_store_core::{AddressId, AddressKind};

use super::conversions::{AddressRecord, convert_addresses};
use super::types::{Acknowledgement, Address, AddressInput};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List the current user's addresses.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn get_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let builder = self.request(Method::GET, "/addresses");
        let records: Option<Vec<AddressRecord>> =
            self.fetch(builder, "Failed to get addresses").await?;
        convert_addresses(records)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, address), fields(kind = %address.kind))]
    pub async fn add_address(&self, address: &AddressInput) -> Result<Acknowledgement, ApiError> {
        let builder = self.request(Method::POST, "/address").json(address);
        self.acknowledge(builder, "Failed to add address").await
    }

    /// Update a home address.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn edit_home_address(
        &self,
        id: &AddressId,
        address: &AddressInput,
    ) -> Result<Acknowledgement, ApiError> {
        self.edit_address(AddressKind::Home, id, address).await
    }

    /// Update a work address.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    pub async fn edit_work_address(
        &self,
        id: &AddressId,
        address: &AddressInput,
    ) -> Result<Acknowledgement, ApiError> {
        self.edit_address(AddressKind::Work, id, address).await
    }

    /// Update an address through the endpoint for its kind.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, id, address), fields(address_id = %id))]
    pub async fn edit_address(
        &self,
        kind: AddressKind,
        id: &AddressId,
        address: &AddressInput,
    ) -> Result<Acknowledgement, ApiError> {
        let path = format!(
            "/address/{}/{}",
            kind.as_str(),
            urlencoding::encode(id.as_str())
        );
        let fallback = match kind {
            AddressKind::Home => "Failed to edit home address",
            AddressKind::Work => "Failed to edit work address",
        };
        let builder = self.request(Method::PUT, &path).json(address);
        self.acknowledge(builder, fallback).await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, id), fields(address_id = %id))]
    pub async fn delete_address(&self, id: &AddressId) -> Result<Acknowledgement, ApiError> {
        let path = format!("/address/{}", urlencoding::encode(id.as_str()));
        let builder = self.request(Method::GET, &path);
        self.acknowledge(builder, "Failed to delete address").await
    }
}
