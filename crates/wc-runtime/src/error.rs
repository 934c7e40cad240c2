//! Host errors

use wc_dom::{CustomElementError, DomError};
use wc_i18n::TranslatorError;
use wc_lifecycle::LifecycleError;

/// Host runtime errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    CustomElement(#[from] CustomElementError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Translator(#[from] TranslatorError),
}
