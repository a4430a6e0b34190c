//! OpenAPI document.

use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::host::{AddressFamily, InterfaceAddress};
use crate::status::ForcedStatusBody;

use super::handlers::{self, DetailsResponse, RootResponse, StatusResponse};

/// OpenAPI description of the diagnostic routes.
#[derive(OpenApi)]
#[openapi(
    info(title = "hostprobe", description = "Diagnostic HTTP service"),
    paths(
        handlers::root,
        handlers::details,
        handlers::forced_status,
        handlers::status,
        handlers::echo,
        handlers::echo_put,
    ),
    components(schemas(
        RootResponse,
        DetailsResponse,
        StatusResponse,
        ForcedStatusBody,
        ErrorBody,
        InterfaceAddress,
        AddressFamily,
    )),
    tags((name = "diagnostics", description = "Host metadata, status codes and echo"))
)]
pub struct ApiDoc;
