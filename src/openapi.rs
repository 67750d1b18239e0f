use utoipa::OpenApi;

use crate::errors::ErrorResponse;
use crate::handlers::parts::{AdjustStockRequest, CreatePartRequest, UpdatePartRequest};
use crate::handlers::replenishment::{
    ConfirmOrderRequest, CreateReplenishmentOrderRequest, GenerateReplenishmentRequest,
    ItemQuantityRequest, OrderItemRequest, ReceiveOrderRequest, ShipOrderRequest,
};
use crate::handlers::suppliers::CreateSupplierRequest;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Facility Operations API",
        description = "Parts stock ledger, availability projection, and supplier replenishment"
    ),
    paths(
        crate::handlers::parts::list_parts,
        crate::handlers::parts::create_part,
        crate::handlers::parts::get_part,
        crate::handlers::parts::update_part,
        crate::handlers::parts::deactivate_part,
        crate::handlers::parts::movement_history,
        crate::handlers::parts::adjust_stock,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::replenishment::list_orders,
        crate::handlers::replenishment::create_order,
        crate::handlers::replenishment::generate_orders,
        crate::handlers::replenishment::get_order,
        crate::handlers::replenishment::confirm_order,
        crate::handlers::replenishment::ship_order,
        crate::handlers::replenishment::cancel_order,
        crate::handlers::replenishment::receive_order,
    ),
    components(schemas(
        ErrorResponse,
        CreatePartRequest,
        UpdatePartRequest,
        AdjustStockRequest,
        CreateSupplierRequest,
        CreateReplenishmentOrderRequest,
        OrderItemRequest,
        GenerateReplenishmentRequest,
        ItemQuantityRequest,
        ConfirmOrderRequest,
        ShipOrderRequest,
        ReceiveOrderRequest,
    )),
    tags(
        (name = "parts", description = "Parts catalog, availability and stock ledger"),
        (name = "suppliers", description = "Supplier catalog"),
        (name = "replenishment", description = "Replenishment planning and order lifecycle"),
    )
)]
pub struct ApiDoc;
