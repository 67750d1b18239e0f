mod common;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use facilityops_api::entities::stock_movement::MovementType;
use facilityops_api::errors::ServiceError;
use facilityops_api::services::stock_ledger::RecordMovement;

fn movement(
    part_id: Uuid,
    movement_type: MovementType,
    magnitude: Decimal,
) -> RecordMovement {
    RecordMovement {
        part_id,
        movement_type,
        magnitude,
        reason: None,
        actor: "warehouse".to_string(),
    }
}

#[tokio::test]
async fn replaying_the_trail_reproduces_current_quantity() {
    let ctx = common::setup().await;
    let customer = Uuid::new_v4();
    let part = common::seed_part(
        &ctx,
        customer,
        "Bearing 6204",
        dec!(5),
        None,
        Decimal::ZERO,
        dec!(1.50),
        None,
    )
    .await;

    let steps = [
        (MovementType::Inbound, dec!(40)),
        (MovementType::Outbound, dec!(12.5)),
        (MovementType::Adjustment, dec!(30)),
        (MovementType::Inbound, dec!(2.25)),
        (MovementType::Outbound, dec!(0)),
    ];
    for (movement_type, magnitude) in steps {
        ctx.ledger
            .record_movement(movement(part.id, movement_type, magnitude))
            .await
            .expect("movement applies");
    }

    let history = ctx.ledger.movement_history(part.id).await.unwrap();
    assert_eq!(history.len(), steps.len());

    let mut replayed = Decimal::ZERO;
    for row in &history {
        assert_eq!(row.previous_quantity, replayed);
        replayed = match MovementType::from_str(&row.movement_type).unwrap() {
            MovementType::Inbound => replayed + row.quantity,
            MovementType::Outbound => replayed - row.quantity,
            MovementType::Adjustment => row.quantity,
        };
        assert_eq!(row.new_quantity, replayed);
    }

    let current = ctx.ledger.get_part(part.id).await.unwrap().current_quantity;
    assert_eq!(replayed, current);
    assert_eq!(current, dec!(32.25));
}

#[tokio::test]
async fn outbound_beyond_stock_fails_and_changes_nothing() {
    let ctx = common::setup().await;
    let part = common::seed_part(
        &ctx,
        Uuid::new_v4(),
        "Grease cartridge",
        dec!(2),
        None,
        dec!(10),
        dec!(4.00),
        None,
    )
    .await;

    let err = ctx
        .ledger
        .record_movement(movement(part.id, MovementType::Outbound, dec!(10.5)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let reloaded = ctx.ledger.get_part(part.id).await.unwrap();
    assert_eq!(reloaded.current_quantity, dec!(10));
    // Only the seed movement exists; the rejected one left no trace.
    assert_eq!(ctx.ledger.movement_history(part.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn adjustment_is_absolute_in_both_directions() {
    let ctx = common::setup().await;
    let part = common::seed_part(
        &ctx,
        Uuid::new_v4(),
        "Air filter",
        dec!(5),
        None,
        dec!(30),
        dec!(12.00),
        None,
    )
    .await;

    let up = ctx
        .ledger
        .record_movement(movement(part.id, MovementType::Adjustment, dec!(50)))
        .await
        .unwrap();
    assert_eq!(up.previous_quantity, dec!(30));
    assert_eq!(up.new_quantity, dec!(50));
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        dec!(50)
    );

    let down = ctx
        .ledger
        .record_movement(movement(part.id, MovementType::Adjustment, dec!(10)))
        .await
        .unwrap();
    assert_eq!(down.previous_quantity, dec!(50));
    assert_eq!(down.new_quantity, dec!(10));
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        dec!(10)
    );
}

#[tokio::test]
async fn adjustment_to_zero_is_allowed() {
    let ctx = common::setup().await;
    let part = common::seed_part(
        &ctx,
        Uuid::new_v4(),
        "Cleaning fluid",
        dec!(1),
        None,
        dec!(7),
        dec!(3.00),
        None,
    )
    .await;

    ctx.ledger
        .record_movement(movement(part.id, MovementType::Adjustment, Decimal::ZERO))
        .await
        .unwrap();
    assert_eq!(
        ctx.ledger.get_part(part.id).await.unwrap().current_quantity,
        Decimal::ZERO
    );
}

#[tokio::test]
async fn negative_magnitude_is_rejected() {
    let ctx = common::setup().await;
    let part = common::seed_part(
        &ctx,
        Uuid::new_v4(),
        "Hex bolts M8",
        dec!(10),
        None,
        dec!(100),
        dec!(0.25),
        None,
    )
    .await;

    let err = ctx
        .ledger
        .record_movement(movement(part.id, MovementType::Inbound, dec!(-3)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidMagnitude(_));
}

#[tokio::test]
async fn movements_against_inactive_parts_are_rejected() {
    let ctx = common::setup().await;
    let part = common::seed_part(
        &ctx,
        Uuid::new_v4(),
        "Door hinge",
        dec!(2),
        None,
        dec!(6),
        dec!(8.00),
        None,
    )
    .await;

    ctx.catalog.deactivate_part(part.id).await.unwrap();

    let err = ctx
        .ledger
        .record_movement(movement(part.id, MovementType::Inbound, dec!(1)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::PartInactive(id) if id == part.id);
}

#[tokio::test]
async fn unknown_part_is_not_found() {
    let ctx = common::setup().await;

    let err = ctx
        .ledger
        .record_movement(movement(Uuid::new_v4(), MovementType::Inbound, dec!(1)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = ctx.ledger.movement_history(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn history_is_ordered_oldest_first() {
    let ctx = common::setup().await;
    let part = common::seed_part(
        &ctx,
        Uuid::new_v4(),
        "Signal lamp",
        dec!(1),
        None,
        Decimal::ZERO,
        dec!(5.00),
        None,
    )
    .await;

    for magnitude in [dec!(3), dec!(5), dec!(7)] {
        ctx.ledger
            .record_movement(movement(part.id, MovementType::Inbound, magnitude))
            .await
            .unwrap();
    }

    let history = ctx.ledger.movement_history(part.id).await.unwrap();
    let quantities: Vec<Decimal> = history.iter().map(|m| m.quantity).collect();
    assert_eq!(quantities, vec![dec!(3), dec!(5), dec!(7)]);
    for pair in history.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
        assert_eq!(pair[1].previous_quantity, pair[0].new_quantity);
    }
}
