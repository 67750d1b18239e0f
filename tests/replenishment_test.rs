mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use uuid::Uuid;

use facilityops_api::entities::replenishment_order::ReplenishmentStatus;
use facilityops_api::errors::ServiceError;
use facilityops_api::services::replenishment::NewOrderItem;

#[tokio::test]
async fn planner_groups_by_supplier_and_reports_skips() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let s1 = common::seed_supplier(&ctx, customer, "Rolamentos Sul").await;
    let s2 = common::seed_supplier(&ctx, customer, "Ferragens Norte").await;

    // A and B are low stock with supplier S1, C is low stock without a
    // supplier, D belongs to S2 but is not low.
    let part_a = common::seed_part(
        &ctx, customer, "Part A", dec!(10), Some(dec!(100)), dec!(5), dec!(2.00), Some(s1.id),
    )
    .await;
    let part_b = common::seed_part(
        &ctx, customer, "Part B", dec!(8), None, dec!(3), dec!(0.50), Some(s1.id),
    )
    .await;
    let part_c = common::seed_part(
        &ctx, customer, "Part C", dec!(4), None, dec!(1), dec!(9.00), None,
    )
    .await;
    let _part_d = common::seed_part(
        &ctx, customer, "Part D", dec!(2), Some(dec!(20)), dec!(15), dec!(1.00), Some(s2.id),
    )
    .await;

    let summary = ctx
        .replenishment
        .generate_replenishment_orders(customer)
        .await
        .unwrap();

    assert_eq!(summary.orders_created, 1);
    assert_eq!(summary.skipped_missing_supplier, vec![part_c.id]);
    // A refills to 100 (95 x 2.00) and B to twice its minimum (13 x 0.50).
    assert_eq!(summary.total_value, dec!(196.50));

    let orders = ctx.replenishment.list_orders(customer, None).await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.order.supplier_id, s1.id);
    assert_eq!(order.order.status, "pendente");
    assert_eq!(order.order.source, "auto");
    assert_eq!(order.items.len(), 2);

    let requested_for = |part_id: Uuid| {
        order
            .items
            .iter()
            .find(|i| i.part_id == part_id)
            .map(|i| i.quantity_requested)
    };
    assert_eq!(requested_for(part_a.id), Some(dec!(95)));
    assert_eq!(requested_for(part_b.id), Some(dec!(13)));
}

#[tokio::test]
async fn full_lifecycle_posts_stock_on_receipt() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Pecas Industriais").await;
    let part = common::seed_part(
        &ctx, customer, "V-belt A42", dec!(10), Some(dec!(100)), dec!(5), dec!(2.00),
        Some(supplier.id),
    )
    .await;

    let summary = ctx
        .replenishment
        .generate_replenishment_orders(customer)
        .await
        .unwrap();
    assert_eq!(summary.orders_created, 1);
    assert_eq!(summary.total_value, dec!(190.00));

    let orders = ctx.replenishment.list_orders(customer, None).await.unwrap();
    let order_id = orders[0].order.id;
    let order_number = orders[0].order.order_number.clone();
    assert_eq!(orders[0].items[0].quantity_requested, dec!(95));

    let confirmed = ctx.replenishment.confirm_order(order_id, vec![]).await.unwrap();
    assert_eq!(confirmed.order.status, "confirmado");
    assert_eq!(confirmed.items[0].quantity_confirmed, Some(dec!(95)));

    let shipped = ctx
        .replenishment
        .ship_order(order_id, Some("TRK-83921".to_string()), vec![])
        .await
        .unwrap();
    assert_eq!(shipped.order.status, "enviado");
    assert_eq!(shipped.order.tracking_code.as_deref(), Some("TRK-83921"));

    let receipt = ctx
        .replenishment
        .confirm_receipt(order_id, Some("complete delivery".to_string()), "warehouse")
        .await
        .unwrap();

    assert_eq!(receipt.order.status, "recebido");
    assert_eq!(receipt.order.received_by.as_deref(), Some("warehouse"));
    assert_eq!(
        receipt.order.received_notes.as_deref(),
        Some("complete delivery")
    );
    assert_eq!(receipt.movements.len(), 1);
    assert_eq!(receipt.movements[0].quantity, dec!(95));
    assert_eq!(receipt.movements[0].new_quantity, dec!(100));
    assert_eq!(
        receipt.movements[0].reason.as_deref(),
        Some(format!("Receipt of order {}", order_number).as_str())
    );

    // Timestamps follow the transition order.
    let confirmed_at = receipt.order.confirmed_at.unwrap();
    let shipped_at = receipt.order.shipped_at.unwrap();
    let received_at = receipt.order.received_at.unwrap();
    assert!(confirmed_at <= shipped_at && shipped_at <= received_at);

    let reloaded = ctx.ledger.get_part(part.id).await.unwrap();
    assert_eq!(reloaded.current_quantity, dec!(100));

    let received = ctx.replenishment.get_order(order_id).await.unwrap();
    assert_eq!(received.items[0].quantity_received, Some(dec!(95)));
}

#[tokio::test]
async fn receipt_requires_shipped_status() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part = common::seed_part(
        &ctx, customer, "Gasket", dec!(5), None, dec!(1), dec!(1.00), Some(supplier.id),
    )
    .await;

    let order = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(9),
            }],
        )
        .await
        .unwrap();

    let err = ctx
        .replenishment
        .confirm_receipt(order.order.id, None, "warehouse")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition(_));

    ctx.replenishment
        .confirm_order(order.order.id, vec![])
        .await
        .unwrap();
    let err = ctx
        .replenishment
        .confirm_receipt(order.order.id, None, "warehouse")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition(_));

    // Nothing was posted along the way.
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        dec!(1)
    );
}

#[tokio::test]
async fn second_receipt_is_rejected_and_posts_nothing() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part = common::seed_part(
        &ctx, customer, "Fuse 10A", dec!(20), Some(dec!(60)), dec!(10), dec!(0.25),
        Some(supplier.id),
    )
    .await;

    ctx.replenishment
        .generate_replenishment_orders(customer)
        .await
        .unwrap();
    let order_id = ctx.replenishment.list_orders(customer, None).await.unwrap()[0]
        .order
        .id;

    ctx.replenishment.confirm_order(order_id, vec![]).await.unwrap();
    ctx.replenishment.ship_order(order_id, None, vec![]).await.unwrap();
    ctx.replenishment
        .confirm_receipt(order_id, None, "warehouse")
        .await
        .unwrap();
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        dec!(60)
    );

    let err = ctx
        .replenishment
        .confirm_receipt(order_id, None, "warehouse")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition(_));

    // Exactly one receipt movement: seed intake plus one inbound.
    let history = ctx.ledger.movement_history(part.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        dec!(60)
    );
}

#[tokio::test]
async fn receipt_rolls_back_entirely_when_an_item_fails() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part_x = common::seed_part(
        &ctx, customer, "Part X", dec!(10), Some(dec!(40)), dec!(5), dec!(1.00),
        Some(supplier.id),
    )
    .await;
    let part_y = common::seed_part(
        &ctx, customer, "Part Y", dec!(6), None, dec!(2), dec!(3.00), Some(supplier.id),
    )
    .await;

    ctx.replenishment
        .generate_replenishment_orders(customer)
        .await
        .unwrap();
    let order_id = ctx.replenishment.list_orders(customer, None).await.unwrap()[0]
        .order
        .id;
    ctx.replenishment.confirm_order(order_id, vec![]).await.unwrap();
    ctx.replenishment.ship_order(order_id, None, vec![]).await.unwrap();

    // One of the targets goes inactive between shipment and receipt.
    ctx.catalog.deactivate_part(part_y.id).await.unwrap();

    let err = ctx
        .replenishment
        .confirm_receipt(order_id, None, "warehouse")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::PartInactive(id) if id == part_y.id);

    // The order is still shipped and no stock moved for either part.
    let order = ctx.replenishment.get_order(order_id).await.unwrap();
    assert_eq!(order.order.status, "enviado");
    assert!(order.order.received_at.is_none());
    assert!(order.items.iter().all(|i| i.quantity_received.is_none()));

    assert_eq!(
        ctx.ledger.get_part(part_x.id).await.unwrap().current_quantity,
        dec!(5)
    );
    assert_eq!(ctx.ledger.movement_history(part_x.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cancellation_is_limited_to_non_terminal_orders() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part = common::seed_part(
        &ctx, customer, "Caster wheel", dec!(4), None, dec!(1), dec!(6.00), Some(supplier.id),
    )
    .await;

    let order = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(7),
            }],
        )
        .await
        .unwrap();

    let cancelled = ctx.replenishment.cancel_order(order.order.id).await.unwrap();
    assert_eq!(cancelled.order.status, "cancelado");

    let err = ctx
        .replenishment
        .cancel_order(order.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition(_));

    // Cancellation never touches stock.
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        dec!(1)
    );

    // A received order cannot be cancelled either.
    let order2 = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(7),
            }],
        )
        .await
        .unwrap();
    ctx.replenishment.confirm_order(order2.order.id, vec![]).await.unwrap();
    ctx.replenishment.ship_order(order2.order.id, None, vec![]).await.unwrap();
    ctx.replenishment
        .confirm_receipt(order2.order.id, None, "warehouse")
        .await
        .unwrap();
    let err = ctx
        .replenishment
        .cancel_order(order2.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition(_));
}

#[tokio::test]
async fn confirmed_orders_count_toward_projection() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part = common::seed_part(
        &ctx, customer, "Chain link", dec!(10), Some(dec!(100)), dec!(5), dec!(2.00),
        Some(supplier.id),
    )
    .await;

    let order = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(95),
            }],
        )
        .await
        .unwrap();

    // Pending orders are not incoming yet.
    let snapshot = ctx.ledger.get_part(part.id).await.unwrap();
    let annotated = ctx.availability.annotate(snapshot).await.unwrap();
    assert_eq!(annotated.availability.incoming_confirmed_quantity, dec!(0));
    assert!(annotated.availability.is_low_stock);
    assert!(annotated.availability.is_projected_low);

    ctx.replenishment.confirm_order(order.order.id, vec![]).await.unwrap();

    let snapshot = ctx.ledger.get_part(part.id).await.unwrap();
    let annotated = ctx.availability.annotate(snapshot).await.unwrap();
    assert_eq!(annotated.availability.incoming_confirmed_quantity, dec!(95));
    assert_eq!(annotated.availability.projected_quantity, dec!(100));
    assert!(annotated.availability.is_low_stock);
    assert!(!annotated.availability.is_projected_low);

    // Once received the stock is physical, not incoming.
    ctx.replenishment.ship_order(order.order.id, None, vec![]).await.unwrap();
    ctx.replenishment
        .confirm_receipt(order.order.id, None, "warehouse")
        .await
        .unwrap();
    let snapshot = ctx.ledger.get_part(part.id).await.unwrap();
    let annotated = ctx.availability.annotate(snapshot).await.unwrap();
    assert_eq!(annotated.availability.incoming_confirmed_quantity, dec!(0));
    assert_eq!(annotated.part.current_quantity, dec!(100));
    assert!(!annotated.availability.is_low_stock);
}

#[tokio::test]
async fn shipped_quantity_wins_over_confirmed_at_receipt() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part = common::seed_part(
        &ctx, customer, "O-ring kit", dec!(10), Some(dec!(50)), dec!(5), dec!(1.00),
        Some(supplier.id),
    )
    .await;

    let order = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(45),
            }],
        )
        .await
        .unwrap();
    let item_id = order.items[0].id;

    // Supplier confirms 40, then only 38 fit in the shipment.
    ctx.replenishment
        .confirm_order(
            order.order.id,
            vec![facilityops_api::services::replenishment::ItemQuantity {
                item_id,
                quantity: dec!(40),
            }],
        )
        .await
        .unwrap();
    ctx.replenishment
        .ship_order(
            order.order.id,
            None,
            vec![facilityops_api::services::replenishment::ItemQuantity {
                item_id,
                quantity: dec!(38),
            }],
        )
        .await
        .unwrap();

    let receipt = ctx
        .replenishment
        .confirm_receipt(order.order.id, None, "warehouse")
        .await
        .unwrap();
    assert_eq!(receipt.movements[0].quantity, dec!(38));
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        dec!(43)
    );
}

#[tokio::test]
async fn manual_orders_validate_their_items() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part = common::seed_part(
        &ctx, customer, "Belt", dec!(4), None, dec!(10), dec!(2.00), Some(supplier.id),
    )
    .await;

    let err = ctx
        .replenishment
        .create_manual_order(customer, supplier.id, vec![])
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(0),
            }],
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // Parts of another customer are invisible.
    let stranger_part = common::seed_part(
        &ctx,
        Uuid::new_v4(),
        "Foreign part",
        dec!(1),
        None,
        dec!(5),
        dec!(1.00),
        None,
    )
    .await;
    let err = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: stranger_part.id,
                quantity_requested: dec!(3),
            }],
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn list_orders_filters_by_status() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    let part = common::seed_part(
        &ctx, customer, "Sensor", dec!(3), None, dec!(10), dec!(15.00), Some(supplier.id),
    )
    .await;

    let pending = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(2),
            }],
        )
        .await
        .unwrap();
    let cancelled = ctx
        .replenishment
        .create_manual_order(
            customer,
            supplier.id,
            vec![NewOrderItem {
                part_id: part.id,
                quantity_requested: dec!(4),
            }],
        )
        .await
        .unwrap();
    ctx.replenishment.cancel_order(cancelled.order.id).await.unwrap();

    let pending_only = ctx
        .replenishment
        .list_orders(customer, Some(ReplenishmentStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending_only.len(), 1);
    assert_eq!(pending_only[0].order.id, pending.order.id);

    let cancelled_only = ctx
        .replenishment
        .list_orders(customer, Some(ReplenishmentStatus::Cancelled))
        .await
        .unwrap();
    assert_eq!(cancelled_only.len(), 1);
    assert_eq!(cancelled_only[0].order.id, cancelled.order.id);

    assert_eq!(ctx.replenishment.list_orders(customer, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn planner_runs_are_not_idempotent_by_design() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let supplier = common::seed_supplier(&ctx, customer, "Supplier").await;
    common::seed_part(
        &ctx, customer, "Filter mat", dec!(10), None, dec!(2), dec!(1.00), Some(supplier.id),
    )
    .await;

    ctx.replenishment
        .generate_replenishment_orders(customer)
        .await
        .unwrap();
    ctx.replenishment
        .generate_replenishment_orders(customer)
        .await
        .unwrap();

    // Two runs while the shortage persists means two open orders; the
    // pre-check belongs to the caller.
    let orders = ctx.replenishment.list_orders(customer, None).await.unwrap();
    assert_eq!(orders.len(), 2);
}
