use super::*;
use shared::message::{MACHINE_QUEUE, MACHINE_RESULT, MachineInstruction, MachineOutcome, MachineResult};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_millis(200);

#[tokio::test]
async fn test_one_instruction_per_unit() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    latte_procedure(&env.pool, shop.latte).await;
    let listener = listen(&env.bus);

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    env.manager.add_line(&alice(), cart.id, add(shop.latte, 2)).await.unwrap();
    env.manager.confirm(&alice(), cart.id).await.unwrap();

    let messages = listener.drain_topic(MACHINE_QUEUE, WAIT).await;
    assert_eq!(messages.len(), 2);
    for msg in messages {
        let instruction: MachineInstruction = msg.parse_payload().unwrap();
        assert_eq!(instruction.activity_id, format!("MK_{}_{}", shop.latte, cart.id));
        assert_eq!(instruction.name, "Make Latte");
        let sequence: Vec<u32> = instruction.actions.iter().map(|a| a.sequence).collect();
        assert_eq!(sequence, vec![1, 2]);
        assert_eq!(instruction.actions[0].action_id, "brew_Coffee_Beans");
        assert_eq!(instruction.actions[1].machine, "Milk Machine");
        assert_eq!(instruction.actions[1].parameters.get("amount"), Some(&4.0));
    }
}

#[tokio::test]
async fn test_drink_without_procedure_is_skipped() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let listener = listen(&env.bus);

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();
    let confirmed = env.manager.confirm(&alice(), cart.id).await.unwrap();

    // confirmation stands; only the instruction is missing
    assert_eq!(confirmed.status, OrderStatus::Confirmed);
    assert!(listener.drain_topic(MACHINE_QUEUE, WAIT).await.is_empty());
}

#[tokio::test]
async fn test_failed_confirm_publishes_nothing() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    latte_procedure(&env.pool, shop.latte).await;
    let listener = listen(&env.bus);

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    env.manager.add_line(&alice(), cart.id, add(shop.latte, 2)).await.unwrap();
    set_stock(&env.pool, shop.milk, 3).await;
    env.manager.confirm(&alice(), cart.id).await.unwrap_err();

    assert!(listener.drain_topic(MACHINE_QUEUE, WAIT).await.is_empty());
}

#[tokio::test]
async fn test_done_result_completes_order() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    latte_procedure(&env.pool, shop.latte).await;

    let token = CancellationToken::new();
    let worker = tokio::spawn(crate::instructions::worker::run_machine_result_worker(
        env.bus.clone(),
        env.manager.clone(),
        token.clone(),
    ));
    // let the worker subscribe
    tokio::time::sleep(Duration::from_millis(20)).await;

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();
    env.manager.confirm(&alice(), cart.id).await.unwrap();

    let result = MachineResult {
        order_id: cart.id,
        activity_id: Some(MachineInstruction::activity_id(shop.latte, cart.id)),
        status: MachineOutcome::Done,
        message: None,
    };
    env.bus.publish_json(MACHINE_RESULT, &result).await.unwrap();

    let mut status = OrderStatus::Confirmed;
    for _ in 0..50 {
        status = status_of(&env.pool, cart.id).await;
        if status == OrderStatus::Done {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status, OrderStatus::Done);
    // stock stays consumed
    assert_eq!(stock(&env.pool, shop.milk).await, 6);

    token.cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_first_done_result_completes_multi_unit_order() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    latte_procedure(&env.pool, shop.latte).await;

    let token = CancellationToken::new();
    let worker = tokio::spawn(crate::instructions::worker::run_machine_result_worker(
        env.bus.clone(),
        env.manager.clone(),
        token.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(20)).await;

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    env.manager.add_line(&alice(), cart.id, add(shop.latte, 2)).await.unwrap();
    env.manager.confirm(&alice(), cart.id).await.unwrap();

    let done = MachineResult {
        order_id: cart.id,
        activity_id: Some(MachineInstruction::activity_id(shop.latte, cart.id)),
        status: MachineOutcome::Done,
        message: None,
    };
    env.bus.publish_json(MACHINE_RESULT, &done).await.unwrap();

    let mut status = OrderStatus::Confirmed;
    for _ in 0..50 {
        status = status_of(&env.pool, cart.id).await;
        if status == OrderStatus::Done {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status, OrderStatus::Done);

    // the second unit's result finds the order done and changes nothing
    env.bus.publish_json(MACHINE_RESULT, &done).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(status_of(&env.pool, cart.id).await, OrderStatus::Done);
    assert_eq!(stock(&env.pool, shop.milk).await, 2);

    token.cancel();
    worker.await.unwrap();
}

#[tokio::test]
async fn test_failed_result_leaves_order_confirmed() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;

    let token = CancellationToken::new();
    let worker = tokio::spawn(crate::instructions::worker::run_machine_result_worker(
        env.bus.clone(),
        env.manager.clone(),
        token.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(20)).await;

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();
    env.manager.confirm(&alice(), cart.id).await.unwrap();

    let result = MachineResult {
        order_id: cart.id,
        activity_id: None,
        status: MachineOutcome::Failed,
        message: Some("milk jam".into()),
    };
    env.bus.publish_json(MACHINE_RESULT, &result).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(status_of(&env.pool, cart.id).await, OrderStatus::Confirmed);
    token.cancel();
    worker.await.unwrap();
}
