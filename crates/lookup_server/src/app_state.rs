use std::sync::Arc;

use crate::api::AddressDirectory;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) directory: Arc<AddressDirectory>,
}
