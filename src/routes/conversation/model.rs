use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub conversation_id: Uuid,
}
