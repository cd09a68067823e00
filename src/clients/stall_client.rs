use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Stall, StallId};
use crate::stall_actor::{StallAction, StallError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Stall actor.
#[derive(Clone)]
pub struct StallClient {
    inner: ResourceClient<Stall>,
}

impl StallClient {
    pub fn new(inner: ResourceClient<Stall>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, stall), fields(stall_id = %stall.id))]
    pub async fn create_stall(&self, stall: Stall) -> Result<StallId, StallError> {
        debug!("Sending request");
        self.inner
            .insert(stall)
            .await
            .map(|stored| stored.record.id)
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_stall(&self, id: StallId, action: StallAction) -> Result<Stall, StallError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map(|((), stored)| stored.record)
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Stall> for StallClient {
    type Error = StallError;

    fn inner(&self) -> &ResourceClient<Stall> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => StallError::NotFound(id),
            FrameworkError::AlreadyExists(id) => StallError::AlreadyExists(id),
            other => StallError::ActorCommunicationError(other.to_string()),
        }
    }
}
