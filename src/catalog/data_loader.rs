use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use super::{Catalog, CatalogData};
use crate::error::{PlannerError, Result};
use crate::models::{Ingredient, Macros};

// Expected column headers of the nutrition/price sheet
const NAME_COL: &str = "Item";
const KCAL_COL: &str = "Calories_kcal_per100g";
const PROTEIN_COL: &str = "Protein_g";
const CARB_COL: &str = "Carbs_g";
const FAT_COL: &str = "Fat_g";
const FIBER_COL: &str = "Fiber_g";
const CALCIUM_COL: &str = "Calcium_mg";
const IRON_COL: &str = "Iron_mg";
const VITAMIN_C_COL: &str = "VitaminC_mg";
const PRICE_COL: &str = "Price_INR_per_kg";

const CSV_UNIT: &str = "g";

const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("Grains", &["rice", "wheat", "flour", "poha", "ragi", "jowar", "bajra", "sattu", "oats"]),
    ("Pulses", &["dal", "chana", "rajma", "lentil", "bean", "soybean"]),
    ("Proteins", &["chicken", "fish", "egg", "meat", "mutton", "prawn"]),
    ("Dairy", &["milk", "curd", "paneer", "cheese", "ghee", "butter"]),
    (
        "Vegetables",
        &["vegetable", "onion", "tomato", "potato", "carrot", "cabbage", "spinach", "cauliflower", "pepper"],
    ),
    ("Fruits", &["fruit", "banana", "apple", "mango", "orange", "pomegranate"]),
    ("Fats & Oils", &["oil", "mustard", "coconut"]),
    ("Spices", &["spice", "turmeric", "cumin", "coriander", "chili"]),
    ("Nuts & Seeds", &["nut", "almond", "cashew", "peanut", "walnut", "seed"]),
];

/// Keyword-based category for an ingredient name. First matching rule wins.
pub fn categorize_ingredient(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or("Other")
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Empty cells are `None`. Anything else must be a finite, non-negative number.
fn parse_amount(s: &str) -> std::result::Result<Option<f64>, &'static str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        Ok(_) => Err("not a finite non-negative number"),
        Err(_) => Err("non-numeric"),
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| PlannerError::InvalidCatalog(format!("Column '{}' not found", name)))
}

fn optional_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Parses the nutrition/price sheet into catalog ingredients.
///
/// Values are per 100 g; the per-kg price is divided by ten. Rows with an
/// empty item name are skipped.
pub fn parse_ingredient_csv<R: Read>(reader: R) -> Result<Vec<Ingredient>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let name_idx = column(&headers, NAME_COL)?;
    let kcal_idx = column(&headers, KCAL_COL)?;
    let protein_idx = column(&headers, PROTEIN_COL)?;
    let carb_idx = column(&headers, CARB_COL)?;
    let fat_idx = column(&headers, FAT_COL)?;
    let price_idx = column(&headers, PRICE_COL)?;
    let fiber_idx = optional_column(&headers, FIBER_COL);
    let calcium_idx = optional_column(&headers, CALCIUM_COL);
    let iron_idx = optional_column(&headers, IRON_COL);
    let vitamin_c_idx = optional_column(&headers, VITAMIN_C_COL);

    let mut ingredients = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result?;
        let name = record.get(name_idx).unwrap_or_default().trim().to_string();
        if name.is_empty() {
            continue;
        }

        let cell = |idx: Option<usize>, col: &str| -> Result<Option<f64>> {
            parse_amount(idx.and_then(|i| record.get(i)).unwrap_or_default()).map_err(|problem| {
                PlannerError::InvalidCatalog(format!(
                    "row {}: '{}' for '{}' is {}",
                    row_index + 1,
                    col,
                    name,
                    problem
                ))
            })
        };
        let required = |idx: usize, col: &str| -> Result<f64> {
            cell(Some(idx), col)?.ok_or_else(|| {
                PlannerError::InvalidCatalog(format!(
                    "row {}: missing '{}' for '{}'",
                    row_index + 1,
                    col,
                    name
                ))
            })
        };

        let price_per_kg = required(price_idx, PRICE_COL)?;
        ingredients.push(Ingredient {
            id: slugify(&name),
            category: categorize_ingredient(&name).to_string(),
            unit: CSV_UNIT.to_string(),
            calories_per_unit: required(kcal_idx, KCAL_COL)?,
            macros: Macros {
                protein: cell(Some(protein_idx), PROTEIN_COL)?.unwrap_or(0.0),
                carbs: cell(Some(carb_idx), CARB_COL)?.unwrap_or(0.0),
                fat: cell(Some(fat_idx), FAT_COL)?.unwrap_or(0.0),
                fiber: cell(fiber_idx, FIBER_COL)?,
                calcium: cell(calcium_idx, CALCIUM_COL)?,
                iron: cell(iron_idx, IRON_COL)?,
                vitamin_c: cell(vitamin_c_idx, VITAMIN_C_COL)?,
            },
            default_price: price_per_kg / 10.0,
            local_prices: HashMap::new(),
            name,
        });
    }

    if ingredients.is_empty() {
        return Err(PlannerError::InvalidCatalog(
            "no valid ingredient rows in CSV".to_string(),
        ));
    }
    tracing::debug!(count = ingredients.len(), "parsed ingredient sheet");
    Ok(ingredients)
}

pub fn load_ingredient_csv(csv_path: &Path) -> Result<Vec<Ingredient>> {
    let file = std::fs::File::open(csv_path)?;
    parse_ingredient_csv(file)
}

/// Loads a `{ "ingredients": [...], "recipes": [...] }` catalog document.
pub fn load_catalog_json(path: &Path) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path)?;
    let data: CatalogData = serde_json::from_str(&contents)?;
    tracing::info!(
        ingredients = data.ingredients.len(),
        recipes = data.recipes.len(),
        path = %path.display(),
        "loaded catalog"
    );
    Catalog::from_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SHEET: &str = "\
Item,Calories_kcal_per100g,Protein_g,Carbs_g,Fat_g,Fiber_g,Price_INR_per_kg
Basmati Rice,356,8.1,78,0.6,1.2,120
Moong Dal,347,24,59,1.2,,140
,100,1,1,1,1,10
Paneer,265,18.3,1.2,20.8,0,400
";

    #[test]
    fn test_parse_sheet() {
        let ingredients = parse_ingredient_csv(SHEET.as_bytes()).unwrap();
        assert_eq!(ingredients.len(), 3);

        let rice = &ingredients[0];
        assert_eq!(rice.id, "basmati-rice");
        assert_eq!(rice.category, "Grains");
        assert_eq!(rice.unit, "g");
        assert!((rice.default_price - 12.0).abs() < 1e-9);
        assert_eq!(rice.macros.fiber, Some(1.2));
        assert_eq!(rice.macros.calcium, None);

        let dal = &ingredients[1];
        assert_eq!(dal.category, "Pulses");
        assert_eq!(dal.macros.fiber, None);

        assert_eq!(ingredients[2].category, "Dairy");
    }

    #[test]
    fn test_missing_required_column() {
        let sheet = "Item,Protein_g\nRice,2\n";
        let err = parse_ingredient_csv(sheet.as_bytes()).unwrap_err();
        assert!(err.to_string().contains(KCAL_COL));
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let sheet = "Item,Calories_kcal_per100g,Protein_g,Carbs_g,Fat_g,Price_INR_per_kg\nRice,130,2,28,0,cheap\n";
        let err = parse_ingredient_csv(sheet.as_bytes()).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidCatalog(_)));
    }

    #[test]
    fn test_nan_negative_and_infinite_values_are_rejected() {
        let header = "Item,Calories_kcal_per100g,Protein_g,Carbs_g,Fat_g,Fiber_g,Price_INR_per_kg\n";
        for row in [
            "Rice,130,2,28,0,,NaN\n",
            "Rice,inf,2,28,0,,60\n",
            "Rice,130,-2,28,0,,60\n",
            "Rice,130,2,28,0,NaN,60\n",
        ] {
            let sheet = format!("{}{}", header, row);
            let err = parse_ingredient_csv(sheet.as_bytes()).unwrap_err();
            assert!(matches!(err, PlannerError::InvalidCatalog(_)), "accepted {:?}", row);
        }
    }

    #[test]
    fn test_categorize_and_slugify() {
        assert_eq!(categorize_ingredient("Mustard Oil"), "Fats & Oils");
        assert_eq!(categorize_ingredient("Quinoa"), "Other");
        assert_eq!(slugify("Toor Dal (split)"), "toor-dal-split");
    }

    #[test]
    fn test_load_from_files() {
        let mut csv_file = NamedTempFile::new().unwrap();
        write!(csv_file, "{}", SHEET).unwrap();
        assert_eq!(load_ingredient_csv(csv_file.path()).unwrap().len(), 3);

        let mut json_file = NamedTempFile::new().unwrap();
        write!(
            json_file,
            r#"{{"ingredients": [{{"id": "oats", "name": "Oats", "category": "Grains", "unit": "g",
                "caloriesPerUnit": 389, "macros": {{"protein": 16.9, "carbs": 66, "fat": 6.9}},
                "defaultPrice": 18}}],
               "recipes": [{{"id": "r1", "name": "Porridge", "calories": 389, "servings": 1,
                "ingredients": [{{"ingredientId": "oats", "quantity": 100}}]}}]}}"#
        )
        .unwrap();
        let catalog = load_catalog_json(json_file.path()).unwrap();
        assert_eq!(catalog.ingredients().len(), 1);
        assert_eq!(catalog.find_recipe_by_name("porridge").unwrap().id, "r1");
    }
}
