use swiftbites_core::{EntityKind, ListQuery, RecipeDraft, RecipeStore};

#[test]
fn recipe_with_lines_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let (recipe_id, expected) = {
        let store = RecipeStore::open_in_dir(dir.path()).unwrap();
        let dinner = store.create_category("Dinner").unwrap();
        let pasta = store.create_ingredient("Spaghetti").unwrap();
        let garlic = store.create_ingredient("Garlic").unwrap();
        let oil = store.create_ingredient("Olive oil").unwrap();

        let recipe = store
            .create_recipe(
                RecipeDraft::new("Aglio e Olio", 2, 20)
                    .summary("Weeknight pasta")
                    .category(dinner.uuid)
                    .instructions("Boil pasta. Warm garlic in oil. Toss.")
                    .image(vec![0x89, 0x50, 0x4e, 0x47])
                    .ingredient(pasta.uuid, " 200 g ")
                    .ingredient(garlic.uuid, "4 cloves")
                    .ingredient(oil.uuid, "1/3 cup"),
            )
            .unwrap();
        assert_eq!(recipe.ingredients[0].quantity, " 200 g ");
        store.close().unwrap();
        (recipe.uuid, recipe)
    };

    let store = RecipeStore::open_in_dir(dir.path()).unwrap();
    let reloaded = store.get_recipe(recipe_id).unwrap().unwrap();
    assert_eq!(reloaded, expected);
    assert_eq!(reloaded.ingredients.len(), 3);
    assert_eq!(store.count(EntityKind::Ingredient).unwrap(), 3);
    assert_eq!(
        store.list_categories(&ListQuery::all()).unwrap()[0].name,
        "Dinner"
    );
}

#[test]
fn updates_persist_and_keep_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.sqlite3");

    let store = RecipeStore::open(&path).unwrap();
    let salt = store.create_ingredient("Salt").unwrap();
    let mut recipe = store
        .create_recipe(RecipeDraft::new("Brine", 1, 5).ingredient(salt.uuid, "1 tbsp"))
        .unwrap();
    recipe.name = "Simple Brine".to_string();
    recipe.serving = 3;
    recipe.image_data = None;
    recipe.ingredients.clear();
    let updated = store.update_recipe(&recipe).unwrap();
    assert_eq!(updated.ingredients.len(), 1);
    store.close().unwrap();

    let store = RecipeStore::open(&path).unwrap();
    let reloaded = store.get_recipe(recipe.uuid).unwrap().unwrap();
    assert_eq!(reloaded.name, "Simple Brine");
    assert_eq!(reloaded.serving, 3);
    assert_eq!(reloaded.ingredients.len(), 1);
    assert_eq!(store.location(), Some(path.as_path()));
}

#[test]
fn records_serialize_with_kind_tag() {
    let store = RecipeStore::open_in_memory().unwrap();
    store.create_category("Snacks").unwrap();

    let records = store
        .list(EntityKind::Category, &ListQuery::all())
        .unwrap();
    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(json[0]["kind"], "category");
    assert_eq!(json[0]["name"], "Snacks");
}
