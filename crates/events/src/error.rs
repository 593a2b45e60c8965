use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventsError {
    #[error("Invalid job state transition for {job_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        job_id: uuid::Uuid,
        from: crate::JobStatus,
        to: crate::JobStatus,
    },
}
