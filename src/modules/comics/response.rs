use serde::Serialize;

use super::models::ComicBook;

pub const CREATED_MESSAGE: &str = "Comic book created successfully";
pub const UPDATED_MESSAGE: &str = "Comic book updated successfully";
pub const DELETED_MESSAGE: &str = "Comic book deleted successfully";
pub const DETAILS_MESSAGE: &str = "Comic book details retrieved successfully";
pub const INVENTORY_MESSAGE: &str = "Inventory list retrieved successfully";

/// Success envelope: `{message, data}`, or just `{message}` when there is no payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn with_data(message: &'static str, data: T) -> Self {
        Self {
            message,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &'static str) -> Self {
        Self {
            message,
            data: None,
        }
    }
}

/// One page of the inventory plus paging metadata.
#[derive(Debug, Serialize)]
pub struct InventoryPage {
    pub message: &'static str,
    pub data: Vec<ComicBook>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only_envelope_omits_data() {
        let value = serde_json::to_value(ApiResponse::message(DELETED_MESSAGE)).unwrap();
        assert_eq!(value, serde_json::json!({ "message": DELETED_MESSAGE }));
    }

    #[test]
    fn inventory_page_shape() {
        let value = serde_json::to_value(InventoryPage {
            message: INVENTORY_MESSAGE,
            data: Vec::new(),
            total: 25,
            page: 3,
            pages: 3,
        })
        .unwrap();
        assert_eq!(value["total"], 25);
        assert_eq!(value["pages"], 3);
        assert_eq!(value["data"], serde_json::json!([]));
    }
}
