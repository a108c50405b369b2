//! Performance benchmarks for catalog loading, merging, and planning
//! Target: <10ms to go from catalogs on disk to a write plan

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loadout::catalog::{
    Capability, Category, MergedCatalog, Mode, Rule, SystemCatalog, SystemCatalogPaths,
    UserCatalog, UserCatalogPaths,
};
use loadout::materialize::Materializer;
use loadout::selection::{self, SelectionRequest};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const MODE_COUNT: usize = 50;
const CATEGORY_COUNT: usize = 8;

fn synthetic_mode(i: usize) -> Mode {
    Mode {
        slug: format!("mode-{i}"),
        name: format!("Mode {i}"),
        role: "You do one synthetic thing well.".to_string(),
        custom_instructions: None,
        capabilities: vec![
            Capability::Tag("read".to_string()),
            Capability::Scoped {
                name: "edit".to_string(),
                file_regex: Some(r"\.(rs|md)$".to_string()),
                description: Some("Source and docs".to_string()),
            },
        ],
        categories: vec![format!("category-{}", i % CATEGORY_COUNT)],
        rules: vec![
            Rule {
                id: format!("shared-{i}"),
                name: format!("Shared {i}"),
                description: String::new(),
                path: PathBuf::from(format!("shared/rule-{i}.md")),
                shared: true,
            },
            Rule {
                id: format!("owned-{i}"),
                name: format!("Owned {i}"),
                description: String::new(),
                path: PathBuf::from(format!("mode-{i}/rule.md")),
                shared: false,
            },
        ],
    }
}

fn synthetic_catalogs() -> (SystemCatalog, UserCatalog) {
    let system = SystemCatalog {
        modes: (0..MODE_COUNT).map(synthetic_mode).collect(),
        categories: (0..CATEGORY_COUNT)
            .map(|i| Category {
                slug: format!("category-{i}"),
                name: format!("Category {i}"),
                description: String::new(),
            })
            .collect(),
    };
    // Every fourth mode is overridden, plus a handful of new ones.
    let user = UserCatalog {
        custom_modes: (0..MODE_COUNT)
            .step_by(4)
            .map(synthetic_mode)
            .chain((MODE_COUNT..MODE_COUNT + 5).map(synthetic_mode))
            .collect(),
        custom_categories: vec![],
    };
    (system, user)
}

/// Write the synthetic catalogs and their rule documents to disk.
fn create_catalog_dirs() -> (TempDir, SystemCatalogPaths, UserCatalogPaths) {
    let temp_dir = TempDir::new().unwrap();
    let (system, user) = synthetic_catalogs();

    let system_root = temp_dir.path().join("bundled");
    fs::create_dir_all(system_root.join("rules")).unwrap();
    fs::write(
        system_root.join("modes.json"),
        serde_json::to_string_pretty(&system.modes).unwrap(),
    )
    .unwrap();
    fs::write(
        system_root.join("categories.json"),
        serde_json::to_string_pretty(&system.categories).unwrap(),
    )
    .unwrap();
    for mode in &system.modes {
        for rule in &mode.rules {
            let path = system_root.join("rules").join(&rule.path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "# Synthetic rule\n").unwrap();
        }
    }

    let user_root = temp_dir.path().join("user");
    let user_paths = UserCatalogPaths::from_root(user_root);
    user.save(&user_paths).unwrap();
    for mode in &user.custom_modes {
        for rule in &mode.rules {
            let path = user_paths.rules_dir.join(&rule.path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "# Synthetic custom rule\n").unwrap();
        }
    }

    let system_paths = SystemCatalogPaths::from_root(system_root).unwrap();
    (temp_dir, system_paths, user_paths)
}

fn benchmark_load_and_merge(c: &mut Criterion) {
    c.bench_function("load_both_catalogs", |b| {
        let (_temp_dir, system_paths, user_paths) = create_catalog_dirs();

        b.iter(|| {
            let system = SystemCatalog::load(black_box(&system_paths)).unwrap();
            let user = UserCatalog::load(black_box(&user_paths)).unwrap();
            black_box((system, user));
        });
    });

    c.bench_function("merge_catalogs", |b| {
        let (system, user) = synthetic_catalogs();

        b.iter(|| {
            let merged = MergedCatalog::merge(black_box(&system), black_box(&user));
            black_box(merged);
        });
    });
}

fn benchmark_resolve_and_plan(c: &mut Criterion) {
    c.bench_function("resolve_category_request", |b| {
        let (system, user) = synthetic_catalogs();
        let merged = MergedCatalog::merge(&system, &user);
        let request = SelectionRequest::categories(["category-0", "category-3"]);

        b.iter(|| {
            let selection = selection::resolve(black_box(&merged), black_box(&request)).unwrap();
            black_box(selection);
        });
    });

    c.bench_function("plan_full_catalog", |b| {
        let (temp_dir, system_paths, user_paths) = create_catalog_dirs();
        let system = SystemCatalog::load(&system_paths).unwrap();
        let user = UserCatalog::load(&user_paths).unwrap();
        let merged = MergedCatalog::merge(&system, &user);

        let all_modes: Vec<String> = merged.modes().map(|m| m.mode.slug.clone()).collect();
        let selection = selection::resolve(&merged, &SelectionRequest::modes(all_modes)).unwrap();
        let materializer = Materializer::new(&system_paths, &user_paths);
        let target = temp_dir.path().join("project");

        b.iter(|| {
            let plan = materializer
                .plan(black_box(&selection), black_box(&target))
                .unwrap();
            black_box(plan);
        });
    });
}

criterion_group!(benches, benchmark_load_and_merge, benchmark_resolve_and_plan);
criterion_main!(benches);
