use super::*;

#[tokio::test]
async fn test_one_cart_per_user() {
    let env = setup().await;
    let first = env.manager.get_or_create_cart(&alice()).await.unwrap();
    let again = env.manager.get_or_create_cart(&alice()).await.unwrap();
    let other = env.manager.get_or_create_cart(&bob()).await.unwrap();

    assert_eq!(first.id, again.id);
    assert_ne!(first.id, other.id);
    assert_eq!(first.status, OrderStatus::Cart);
    assert!(first.lines.is_empty());
    assert_eq!(first.total_price, 0.0);
}

#[tokio::test]
async fn test_merge_on_add() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();

    env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();
    let merged = env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();
    assert_eq!(merged.quantity, 2);

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 2);
    assert_eq!(cart.total_price, 7.0);
}

#[tokio::test]
async fn test_add_then_remove_restores_total() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let espresso = add_drink(&env.pool, "Espresso", 2.5).await;
    add_recipe(&env.pool, espresso, shop.beans, 18).await;

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();
    let before = env.manager.get_or_create_cart(&alice()).await.unwrap().total_price;

    let line = env.manager.add_line(&alice(), cart.id, add(espresso, 2)).await.unwrap();
    let with_espresso = env.manager.get_or_create_cart(&alice()).await.unwrap();
    assert_eq!(with_espresso.total_price, 3.5 + 5.0);

    env.manager.remove_line(&alice(), line.id).await.unwrap();
    let after = env.manager.get_or_create_cart(&alice()).await.unwrap();
    assert_eq!(after.total_price, before);
    assert_eq!(after.lines.len(), 1);
}

#[tokio::test]
async fn test_add_rejects_more_than_stock() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();

    // 3 lattes need 12 milk
    let err = env.manager.add_line(&alice(), cart.id, add(shop.latte, 3)).await.unwrap_err();
    match err {
        OrderError::InsufficientStock { name, required, available, .. } => {
            assert_eq!(name, "Milk");
            assert_eq!(required, 12);
            assert_eq!(available, 10);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // stock is only checked, never held by a cart
    assert_eq!(stock(&env.pool, shop.milk).await, 10);
    assert!(env.manager.get_or_create_cart(&alice()).await.unwrap().lines.is_empty());
}

#[tokio::test]
async fn test_add_rejects_drink_without_recipe() {
    let env = setup().await;
    let water = add_drink(&env.pool, "Mystery Brew", 1.0).await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();

    let err = env.manager.add_line(&alice(), cart.id, add(water, 1)).await.unwrap_err();
    assert!(matches!(err, OrderError::RecipeMissing { drink_id, .. } if drink_id == water));
}

#[tokio::test]
async fn test_add_validates_quantity() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();

    for quantity in [0, -1, 100] {
        let err = env.manager.add_line(&alice(), cart.id, add(shop.latte, quantity)).await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)), "quantity {quantity}");
    }
}

#[tokio::test]
async fn test_update_checks_only_the_increase() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    let line = env.manager.add_line(&alice(), cart.id, add(shop.latte, 2)).await.unwrap();

    // 2 -> 3 needs 4 more milk, which exists even though 12 in total does not
    let LineUpdate::Updated(updated) = env
        .manager
        .update_line(&alice(), line.id, set_quantity(3))
        .await
        .unwrap()
    else {
        panic!("line should still exist");
    };
    assert_eq!(updated.quantity, 3);

    // 3 -> 6 needs 12 more
    let err = env.manager.update_line(&alice(), line.id, set_quantity(6)).await.unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    // decreasing never checks stock
    set_stock(&env.pool, shop.milk, 0).await;
    let result = env.manager.update_line(&alice(), line.id, set_quantity(1)).await.unwrap();
    assert!(matches!(result, LineUpdate::Updated(ref l) if l.quantity == 1));
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    let line = env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();

    let result = env.manager.update_line(&alice(), line.id, set_quantity(0)).await.unwrap();
    assert_eq!(result, LineUpdate::Removed);

    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    assert!(cart.lines.is_empty());
    assert_eq!(cart.total_price, 0.0);
}

#[tokio::test]
async fn test_other_users_cart_is_off_limits() {
    let env = setup().await;
    let shop = latte_shop(&env.pool).await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();
    let line = env.manager.add_line(&alice(), cart.id, add(shop.latte, 1)).await.unwrap();

    let err = env.manager.add_line(&bob(), cart.id, add(shop.latte, 1)).await.unwrap_err();
    assert!(matches!(err, OrderError::NotOwner(id) if id == cart.id));
    let err = env.manager.remove_line(&bob(), line.id).await.unwrap_err();
    assert!(matches!(err, OrderError::NotOwner(_)));

    // staff may edit any cart
    env.manager.update_line(&staff(), line.id, set_quantity(2)).await.unwrap();
}

#[tokio::test]
async fn test_unknown_line_and_drink() {
    let env = setup().await;
    let cart = env.manager.get_or_create_cart(&alice()).await.unwrap();

    let err = env.manager.remove_line(&alice(), 424242).await.unwrap_err();
    assert!(matches!(err, OrderError::LineNotFound(424242)));

    let err = env.manager.add_line(&alice(), cart.id, add(424242, 1)).await.unwrap_err();
    assert!(matches!(err, OrderError::DrinkNotFound(424242)));
}
