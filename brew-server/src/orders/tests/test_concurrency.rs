use super::*;

/// Confirms racing for the same ingredient: each succeeds or fails with
/// InsufficientStock, and stock never goes negative.
#[tokio::test]
async fn test_concurrent_confirms_never_oversell() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    // enough for exactly two single-latte orders
    set_stock(&env.pool, shop.milk, 8).await;

    let users: Vec<CurrentUser> = (0..5).map(|i| CurrentUser::customer(format!("user-{i}"))).collect();
    let mut order_ids = Vec::new();
    for user in &users {
        let cart = env.manager.get_or_create_cart(user).await.unwrap();
        env.manager.add_line(user, cart.id, add(shop.latte, 1)).await.unwrap();
        order_ids.push(cart.id);
    }

    let mut handles = Vec::new();
    for (user, order_id) in users.into_iter().zip(order_ids) {
        let manager = env.manager.clone();
        handles.push(tokio::spawn(async move { manager.confirm(&user, order_id).await }));
    }

    let mut confirmed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                assert_eq!(order.status, OrderStatus::Confirmed);
                confirmed += 1;
            }
            Err(OrderError::InsufficientStock { name, .. }) => assert_eq!(name, "Milk"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(confirmed, 2);
    assert_eq!(stock(&env.pool, shop.milk).await, 0);
    assert_eq!(stock(&env.pool, shop.beans).await, 100 - 2 * 18);
}

#[tokio::test]
async fn test_concurrent_get_or_create_cart_yields_one_cart() {
    let env = setup().await;
    let mut handles = Vec::new();
    for _ in 0..4 {
        let manager = env.manager.clone();
        handles.push(tokio::spawn(async move { manager.get_or_create_cart(&alice()).await }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn test_confirm_and_cancel_interleaved_conserve_stock() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    set_stock(&env.pool, shop.milk, 100).await;
    set_stock(&env.pool, shop.beans, 1000).await;

    let mut handles = Vec::new();
    for i in 0..6 {
        let manager = env.manager.clone();
        let latte = shop.latte;
        handles.push(tokio::spawn(async move {
            let user = CurrentUser::customer(format!("guest-{i}"));
            let cart = manager.get_or_create_cart(&user).await?;
            manager.add_line(&user, cart.id, add(latte, 2)).await?;
            manager.confirm(&user, cart.id).await?;
            manager.cancel(&user, cart.id).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(stock(&env.pool, shop.milk).await, 100);
    assert_eq!(stock(&env.pool, shop.beans).await, 1000);
}
