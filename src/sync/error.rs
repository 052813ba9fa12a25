use thiserror::Error;

use crate::scene_graph::ObjectId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("no prototype object was configured")]
    MissingPrototype,

    #[error("prototype object {0:?} does not exist in the scene")]
    PrototypeNotFound(ObjectId),
}
