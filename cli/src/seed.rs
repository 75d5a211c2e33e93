//! The `seed` command: insert sample categories and recipes.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use pantry_core::{
    Category, Config, Ingredient, InstructionStep, Recipe, RecipeStatus, RecipeStore, Store,
    Timing,
};

struct SeedCategory {
    path: &'static str,
    title_lt: &'static str,
    title_en: &'static str,
    order: i32,
}

struct SeedRecipe {
    slug: &'static str,
    title_lt: &'static str,
    title_en: &'static str,
    description_lt: &'static str,
    category: &'static str,
    ingredients: &'static [(&'static str, f64, &'static str)], // (name, amount, unit)
    steps: &'static [&'static str],
    prep_minutes: u32,
    cook_minutes: u32,
    tags: &'static [&'static str],
}

const SAMPLE_CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        path: "sriubos",
        title_lt: "Sriubos",
        title_en: "Soups",
        order: 1,
    },
    SeedCategory {
        path: "karsti-patiekalai",
        title_lt: "Karšti patiekalai",
        title_en: "Main dishes",
        order: 2,
    },
    SeedCategory {
        path: "desertai",
        title_lt: "Desertai",
        title_en: "Desserts",
        order: 3,
    },
];

const SAMPLE_RECIPES: &[SeedRecipe] = &[
    SeedRecipe {
        slug: "saltibarsciai",
        title_lt: "Šaltibarščiai",
        title_en: "Cold beet soup",
        description_lt: "Gaivi šalta burokėlių sriuba su kefyru, agurkais ir krapais.",
        category: "sriubos",
        ingredients: &[
            ("virti burokėliai", 500.0, "g"),
            ("kefyras", 1.0, "l"),
            ("agurkai", 2.0, "vnt."),
            ("kiaušiniai", 2.0, "vnt."),
            ("krapai", 1.0, "saujelė"),
            ("svogūnų laiškai", 1.0, "saujelė"),
        ],
        steps: &[
            "Burokėlius sutarkuokite burokine tarka.",
            "Agurkus supjaustykite šiaudeliais, laiškus ir krapus susmulkinkite.",
            "Viską sudėkite į puodą ir užpilkite kefyru.",
            "Atšaldykite ir patiekite su virtomis bulvėmis.",
        ],
        prep_minutes: 20,
        cook_minutes: 0,
        tags: &["vasara", "šalta", "tradicinis"],
    },
    SeedRecipe {
        slug: "morku-sriuba",
        title_lt: "Morkų sriuba",
        title_en: "Carrot soup",
        description_lt: "Trinta morkų sriuba su imbieru ir grietinėle.",
        category: "sriubos",
        ingredients: &[
            ("morkos", 600.0, "g"),
            ("svogūnas", 1.0, "vnt."),
            ("imbieras", 20.0, "g"),
            ("grietinėlė", 200.0, "ml"),
            ("daržovių sultinys", 1.0, "l"),
        ],
        steps: &[
            "Svogūną pakepinkite, sudėkite morkas ir imbierą.",
            "Užpilkite sultiniu ir virkite, kol morkos suminkštės.",
            "Sutrinkite, supilkite grietinėlę ir pašildykite.",
        ],
        prep_minutes: 15,
        cook_minutes: 25,
        tags: &["trinta", "vegetariška"],
    },
    SeedRecipe {
        slug: "cepelinai",
        title_lt: "Cepelinai",
        title_en: "Potato dumplings",
        description_lt: "Tradiciniai cepelinai su mėsos įdaru ir spirgučių padažu.",
        category: "karsti-patiekalai",
        ingredients: &[
            ("bulvės", 2.0, "kg"),
            ("kiauliena", 400.0, "g"),
            ("svogūnas", 1.0, "vnt."),
            ("lašiniai", 150.0, "g"),
            ("grietinė", 200.0, "g"),
        ],
        steps: &[
            "Dalį bulvių išvirkite, likusias sutarkuokite ir nuspauskite.",
            "Paruoškite mėsos įdarą su svogūnais ir prieskoniais.",
            "Suformuokite cepelinus ir virkite pasūdytame vandenyje apie 25 minutes.",
            "Patiekite su spirgučių ir grietinės padažu.",
        ],
        prep_minutes: 60,
        cook_minutes: 30,
        tags: &["tradicinis", "šventinis"],
    },
    SeedRecipe {
        slug: "tinginys",
        title_lt: "Tinginys",
        title_en: "Chocolate biscuit cake",
        description_lt: "Šokoladinis sausainių desertas be kepimo.",
        category: "desertai",
        ingredients: &[
            ("sausainiai", 500.0, "g"),
            ("sviestas", 200.0, "g"),
            ("kakava", 4.0, "šaukštai"),
            ("sutirštintas pienas", 1.0, "vnt."),
        ],
        steps: &[
            "Sausainius palaužykite nedideliais gabalėliais.",
            "Ištirpinkite sviestą su kakava ir sutirštintu pienu.",
            "Sumaišykite su sausainiais, suvyniokite į plėvelę ir šaldykite per naktį.",
        ],
        prep_minutes: 20,
        cook_minutes: 0,
        tags: &["be kepimo", "saldumynas"],
    },
];

fn localized(lt: &str, en: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("lt".to_string(), lt.to_string()), ("en".to_string(), en.to_string())])
}

fn build_recipe(seed: &SeedRecipe, now: &str) -> Recipe {
    Recipe {
        slug: seed.slug.to_string(),
        title: localized(seed.title_lt, seed.title_en),
        description: BTreeMap::from([("lt".to_string(), seed.description_lt.to_string())]),
        ingredients: seed
            .ingredients
            .iter()
            .map(|(name, amount, unit)| Ingredient {
                name: BTreeMap::from([("lt".to_string(), name.to_string())]),
                amount: *amount,
                unit: BTreeMap::from([("lt".to_string(), unit.to_string())]),
            })
            .collect(),
        steps: seed
            .steps
            .iter()
            .enumerate()
            .map(|(i, text)| InstructionStep {
                number: (i + 1) as u32,
                text: BTreeMap::from([("lt".to_string(), text.to_string())]),
            })
            .collect(),
        timing: Some(Timing {
            prep_minutes: seed.prep_minutes,
            cook_minutes: seed.cook_minutes,
            total_minutes: seed.prep_minutes + seed.cook_minutes,
        }),
        category_path: seed.category.to_string(),
        tags: seed.tags.iter().map(|t| t.to_string()).collect(),
        status: RecipeStatus::Public,
        created_at: Some(now.to_string()),
        updated_at: Some(now.to_string()),
        ..Default::default()
    }
}

pub async fn run(config: &Config) -> Result<()> {
    let store = Store::connect(config)
        .await
        .context("Failed to connect to document store")?;
    let now = chrono::Utc::now().to_rfc3339();

    let mut categories_created = 0;
    let mut categories_skipped = 0;
    for seed in SAMPLE_CATEGORIES {
        if store.find_category(seed.path).await?.is_some() {
            println!("  Category exists, skipping: {}", seed.path);
            categories_skipped += 1;
            continue;
        }
        let category = Category {
            path: seed.path.to_string(),
            title: localized(seed.title_lt, seed.title_en),
            active: true,
            order: seed.order,
            ..Default::default()
        };
        store
            .upsert_category(&category)
            .await
            .with_context(|| format!("Failed to create category: {}", seed.path))?;
        println!("  Created category: {}", seed.path);
        categories_created += 1;
    }

    let mut recipes_created = 0;
    let mut recipes_skipped = 0;
    for seed in SAMPLE_RECIPES {
        if store.find_by_slug(seed.slug).await?.is_some() {
            println!("  Recipe exists, skipping: {}", seed.slug);
            recipes_skipped += 1;
            continue;
        }
        let recipe = build_recipe(seed, &now);
        store
            .insert(&recipe)
            .await
            .with_context(|| format!("Failed to create recipe: {}", seed.slug))?;
        println!("  Created recipe: {}", seed.slug);
        recipes_created += 1;
    }

    println!();
    println!("{}", "=".repeat(50));
    println!("SEED DATA COMPLETE");
    println!("{}", "=".repeat(50));
    println!(
        "Categories: {} created, {} skipped",
        categories_created, categories_skipped
    );
    println!(
        "Recipes:    {} created, {} skipped",
        recipes_created, recipes_skipped
    );
    println!("{}", "=".repeat(50));

    Ok(())
}
