//! Typed request/response contracts and per-endpoint schema tables.
//!
//! Source-name lists mirror what the backend actually emits: most endpoints
//! use Spanish camelCase, older ones PascalCase or snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::{optional, required, FieldKind, Schema};

pub(crate) const SIGN_IN_PATH: &str = "api/sesion/login";
pub(crate) const SIGN_OUT_PATH: &str = "api/sesion/logout";
pub(crate) const REMINDERS_PATH: &str = "api/recordatorios";
pub(crate) const MEDICATIONS_PATH: &str = "api/medicamentos";
pub(crate) const RECORDS_PATH: &str = "api/registros";

// ---------------------------------------------------------------------------
// Sign in / sign out
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "clave")]
    pub password: String,
}

/// Session established by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user_id: i64,
    #[serde(default)]
    pub display_name: Option<String>,
}

pub(crate) const SESSION_SCHEMA: Schema = Schema {
    fields: &[
        required(
            "token",
            &["token", "accessToken", "access_token"],
            FieldKind::String,
        ),
        optional(
            "refresh_token",
            &["refreshToken", "refresh_token", "tokenRefresco"],
            FieldKind::String,
        ),
        required(
            "user_id",
            &["idUsuario", "id_usuario", "userId"],
            FieldKind::Integer,
        ),
        optional(
            "display_name",
            &["nombre", "nombreUsuario", "nombre_usuario"],
            FieldKind::String,
        ),
    ],
};

/// Empty acknowledgement payload for operations whose response carries only
/// the success flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ack {}

pub(crate) const ACK_SCHEMA: Schema = Schema { fields: &[] };

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub medication: String,
    #[serde(default)]
    pub dose: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub taken: bool,
}

const REMINDER_SCHEMA: Schema = Schema {
    fields: &[
        required(
            "id",
            &["idRecordatorio", "id_recordatorio", "id"],
            FieldKind::Integer,
        ),
        required(
            "medication",
            &["medicamento", "nombreMedicamento", "nombre_medicamento"],
            FieldKind::String,
        ),
        optional("dose", &["dosis", "dose"], FieldKind::String),
        required(
            "scheduled_at",
            &["fechaHora", "fecha_hora", "fechaProgramada"],
            FieldKind::DateTime,
        ),
        optional("taken", &["tomado", "taken"], FieldKind::Boolean),
    ],
};
const REMINDER_KIND: FieldKind = FieldKind::Object(&REMINDER_SCHEMA);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReminderList {
    pub reminders: Vec<Reminder>,
}

pub(crate) const REMINDER_LIST_SCHEMA: Schema = Schema {
    fields: &[required(
        "reminders",
        &["recordatorios", "listaRecordatorios", "lista_recordatorios"],
        FieldKind::List(&REMINDER_KIND),
    )],
};

// ---------------------------------------------------------------------------
// Medications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub presentation: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

const MEDICATION_SCHEMA: Schema = Schema {
    fields: &[
        required(
            "id",
            &["idMedicamento", "id_medicamento", "id"],
            FieldKind::Integer,
        ),
        required(
            "name",
            &["nombre", "nombreComercial", "nombre_comercial"],
            FieldKind::String,
        ),
        optional(
            "presentation",
            &["presentacion", "presentation"],
            FieldKind::String,
        ),
        optional(
            "barcode",
            &["codigoBarras", "codigo_barras"],
            FieldKind::String,
        ),
    ],
};
const MEDICATION_KIND: FieldKind = FieldKind::Object(&MEDICATION_SCHEMA);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MedicationList {
    pub medications: Vec<Medication>,
}

pub(crate) const MEDICATION_LIST_SCHEMA: Schema = Schema {
    fields: &[required(
        "medications",
        &["medicamentos", "listaMedicamentos", "lista_medicamentos"],
        FieldKind::List(&MEDICATION_KIND),
    )],
};

// ---------------------------------------------------------------------------
// Intake records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SaveRecordRequest {
    #[serde(rename = "idMedicamento")]
    pub medication_id: i64,
    #[serde(rename = "fechaToma")]
    pub taken_at: DateTime<Utc>,
    #[serde(rename = "observaciones", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedRecord {
    pub id: i64,
}

pub(crate) const SAVED_RECORD_SCHEMA: Schema = Schema {
    fields: &[required(
        "id",
        &["idRegistro", "id_registro", "id"],
        FieldKind::Integer,
    )],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::outcome::Outcome;

    #[test]
    fn sign_in_request_serializes_to_backend_field_names() {
        let request = SignInRequest {
            username: "ana".to_string(),
            password: "secreta".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({"usuario": "ana", "clave": "secreta"}));
    }

    #[test]
    fn session_payload_resolves_pascal_cased_token() {
        let body = br#"{"resultado": true, "Token": "abc123", "IdUsuario": 7}"#;
        let outcome: Outcome<Session> = normalize(body, &SESSION_SCHEMA);
        let session = outcome.payload().unwrap();
        assert_eq!(session.token, "abc123");
        assert_eq!(session.user_id, 7);
    }

    #[test]
    fn reminder_list_resolves_mixed_entry_casing() {
        let body = br#"{
            "Recordatorios": [
                {"IdRecordatorio": 1, "Medicamento": "Ibuprofeno", "Dosis": "400mg",
                 "FechaHora": "2026-03-01T08:00:00", "Tomado": true},
                {"id_recordatorio": 2, "medicamento": "Amoxicilina",
                 "fecha_hora": "2026-03-01 12:00:00"}
            ]
        }"#;
        let outcome: Outcome<ReminderList> = normalize(body, &REMINDER_LIST_SCHEMA);
        let list = outcome.payload().unwrap();
        assert_eq!(list.reminders.len(), 2);
        assert_eq!(list.reminders[0].medication, "Ibuprofeno");
        assert!(list.reminders[0].taken);
        assert_eq!(list.reminders[1].id, 2);
        assert!(!list.reminders[1].taken);
        assert!(list.reminders[1].dose.is_none());
    }

    #[test]
    fn save_record_request_omits_empty_notes() {
        let request = SaveRecordRequest {
            medication_id: 3,
            taken_at: "2026-03-01T08:00:00Z".parse().unwrap(),
            notes: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("observaciones").is_none());
        assert_eq!(value["idMedicamento"], 3);
    }
}
