use std::time::Duration;
use swiftbites_core::{ChangeNotice, EntityKind, RecipeDraft, RecipeStore};

fn drain(receiver: &std::sync::mpsc::Receiver<ChangeNotice>) -> Vec<ChangeNotice> {
    receiver.try_iter().collect()
}

#[test]
fn committed_write_notifies_subscribers() {
    let store = RecipeStore::open_in_memory().unwrap();
    let receiver = store.subscribe(&[]);

    store.create_category("Brunch").unwrap();

    let notice = receiver.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(notice.kind, EntityKind::Category);
    assert!(drain(&receiver).is_empty());
}

#[test]
fn failed_write_sends_nothing() {
    let store = RecipeStore::open_in_memory().unwrap();
    store.create_ingredient("Basil").unwrap();
    let receiver = store.subscribe(&[]);

    assert!(store.create_ingredient("basil").is_err());
    assert!(store.create_category("").is_err());
    assert!(drain(&receiver).is_empty());
}

#[test]
fn category_delete_notifies_category_and_recipe_watchers() {
    let store = RecipeStore::open_in_memory().unwrap();
    let vegan = store.create_category("Vegan").unwrap();
    store
        .create_recipe(RecipeDraft::new("Lentil Stew", 4, 50).category(vegan.uuid))
        .unwrap();

    let recipes = store.subscribe(&[EntityKind::Recipe]);
    let everything = store.subscribe(&[]);
    store.delete_category(vegan.uuid).unwrap();

    let recipe_notices = drain(&recipes);
    assert_eq!(recipe_notices.len(), 1);
    assert_eq!(recipe_notices[0].kind, EntityKind::Recipe);

    let all_notices = drain(&everything);
    let kinds = all_notices
        .iter()
        .map(|notice| notice.kind)
        .collect::<Vec<_>>();
    assert!(kinds.contains(&EntityKind::Category));
    assert!(kinds.contains(&EntityKind::Recipe));
    assert!(all_notices
        .iter()
        .all(|notice| notice.sequence == all_notices[0].sequence));
}

#[test]
fn sequences_increase_per_commit() {
    let store = RecipeStore::open_in_memory().unwrap();
    let receiver = store.subscribe(&[EntityKind::Ingredient]);

    store.create_ingredient("Thyme").unwrap();
    store.create_category("Herbs").unwrap();
    store.create_ingredient("Sage").unwrap();

    let notices = drain(&receiver);
    assert_eq!(notices.len(), 2);
    assert!(notices[0].sequence < notices[1].sequence);
}

#[test]
fn recipe_watchers_hear_about_line_changes() {
    let store = RecipeStore::open_in_memory().unwrap();
    let honey = store.create_ingredient("Honey").unwrap();
    let lemon = store.create_ingredient("Lemon").unwrap();
    let tea = store
        .create_recipe(RecipeDraft::new("Hot Toddy", 1, 5))
        .unwrap();
    let recipes = store.subscribe(&[EntityKind::Recipe]);

    let line = store
        .add_ingredient_to_recipe(tea.uuid, honey.uuid, "1 tbsp")
        .unwrap();
    assert_eq!(drain(&recipes).len(), 1);
    assert_eq!(
        store.get_recipe(tea.uuid).unwrap().unwrap().ingredients.len(),
        1
    );

    store
        .remove_ingredient_from_recipe(tea.uuid, line.uuid)
        .unwrap();
    assert_eq!(drain(&recipes).len(), 1);

    store
        .set_recipe_ingredients(
            tea.uuid,
            &[swiftbites_core::IngredientLine::new(lemon.uuid, "1 slice")],
        )
        .unwrap();
    let notices = drain(&recipes);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, EntityKind::Recipe);
}

#[test]
fn concurrent_writers_deliver_sequences_in_order() {
    let store = std::sync::Arc::new(RecipeStore::open_in_memory().unwrap());
    let receiver = store.subscribe(&[EntityKind::Ingredient]);

    let handles = (0..4)
        .map(|worker| {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                for index in 0..10 {
                    store
                        .create_ingredient(format!("spice {worker}-{index}"))
                        .unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let sequences = drain(&receiver)
        .into_iter()
        .map(|notice| notice.sequence)
        .collect::<Vec<_>>();
    assert_eq!(sequences.len(), 40);
    assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
}
