pub const HIGH_CALORIES: u32 = 400;
pub const LOW_CALORIES: u32 = 120;

struct Rule {
    applies: fn(&Macros) -> bool,
    sentence: &'static str,
}

struct Macros {
    calories: u32,
    fat_pct: u32,
    carb_pct: u32,
    protein_pct: u32,
}

// Evaluated in order. The low-calorie rule only fires when the high-calorie one
// does not; calories in 121..=399 trigger neither.
const RULES: &[Rule] = &[
    Rule {
        applies: |m| m.calories >= HIGH_CALORIES,
        sentence: "Calories are high per serving; watch out if you are in a deficit.",
    },
    Rule {
        applies: |m| m.calories < HIGH_CALORIES && m.calories <= LOW_CALORIES,
        sentence: "Relatively low calorie, good for a snack.",
    },
    Rule {
        applies: |m| m.fat_pct >= 50,
        sentence: "High fat content → likely fried, coconut milk, or oily.",
    },
    Rule {
        applies: |m| m.protein_pct >= 25,
        sentence: "High protein, helps keep you full longer.",
    },
    Rule {
        applies: |m| m.carb_pct >= 60,
        sentence: "High carbs, quick energy source but may spike blood sugar.",
    },
];

const BALANCED: &str = "Balanced macro composition for a standard meal.";

pub fn advise(calories: u32, fat_pct: u32, carb_pct: u32, protein_pct: u32) -> String {
    let m = Macros {
        calories,
        fat_pct,
        carb_pct,
        protein_pct,
    };
    let fired: Vec<&str> = RULES
        .iter()
        .filter(|r| (r.applies)(&m))
        .map(|r| r.sentence)
        .collect();

    if fired.is_empty() {
        BALANCED.to_string()
    } else {
        fired.join(" ")
    }
}
