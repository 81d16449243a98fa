//! Request/response bodies for the REST backend.
//!
//! Field names follow the backend's camelCase JSON convention.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// === Authentication ===

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
}

// === Vehicles ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
    pub odometer: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: Option<String>,
}

// === Reminders ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: i64,
    pub vehicle_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_odometer: Option<i64>,
    pub completed: bool,
}

// === Maintenance logs ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceLog {
    pub id: i64,
    pub vehicle_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub performed_at: DateTime<Utc>,
    pub odometer: Option<i64>,
    pub cost_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaintenanceLog {
    pub vehicle_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub performed_at: DateTime<Utc>,
    pub odometer: Option<i64>,
    pub cost_cents: Option<i64>,
}

// === Notifications ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

// === VIN decoding ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VinDecodeResult {
    pub vin: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub trim: Option<String>,
}

/// Error body the backend sends alongside non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_decodes_from_backend_json() {
        let vehicle: Vehicle = serde_json::from_str(
            r#"{
                "id": 5,
                "name": "Daily driver",
                "make": "Subaru",
                "model": "Outback",
                "year": 2019,
                "vin": "4S4BSANC5K3300000",
                "odometer": 48211
            }"#,
        )
        .unwrap();

        assert_eq!(vehicle.id, 5);
        assert_eq!(vehicle.make, "Subaru");
        assert_eq!(vehicle.odometer, Some(48211));
    }

    #[test]
    fn test_reminder_optional_fields_default() {
        let reminder: Reminder = serde_json::from_str(
            r#"{
                "id": 1,
                "vehicleId": 5,
                "title": "Oil change",
                "notes": null,
                "dueDate": "2026-09-15",
                "dueOdometer": null,
                "completed": false
            }"#,
        )
        .unwrap();

        assert_eq!(reminder.vehicle_id, 5);
        assert_eq!(
            reminder.due_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 15).unwrap())
        );
        assert!(reminder.due_odometer.is_none());
        assert!(!reminder.completed);
    }

    #[test]
    fn test_vin_decode_result() {
        let decoded: VinDecodeResult = serde_json::from_str(
            r#"{"vin": "4S4BSANC5K3300000", "make": "Subaru", "model": null, "year": 2019, "trim": null}"#,
        )
        .unwrap();

        assert_eq!(decoded.make.as_deref(), Some("Subaru"));
        assert!(decoded.model.is_none());
    }
}
