//! Baked-in default exercise catalog, seeded into an empty store on first
//! read. Categories here are the fixed set the suggestion engine iterates.

use super::{Difficulty, ExerciseTemplate, generate_id};

pub const CATEGORIES: [&str; 5] = ["Chest", "Back", "Legs", "Shoulders", "Arms"];

fn template(
    name: &str,
    category: &str,
    target_muscles: &[&str],
    equipment: &str,
    difficulty: Difficulty,
) -> ExerciseTemplate {
    ExerciseTemplate {
        id: generate_id(),
        name: name.to_string(),
        category: category.to_string(),
        target_muscles: target_muscles.iter().map(|m| m.to_string()).collect(),
        equipment: Some(equipment.to_string()),
        difficulty,
        description: None,
    }
}

pub fn default_exercise_templates() -> Vec<ExerciseTemplate> {
    use Difficulty::*;
    vec![
        // Chest
        template(
            "Bench Press",
            "Chest",
            &["Pectoralis Major", "Anterior Deltoid", "Triceps"],
            "Barbell",
            Intermediate,
        ),
        template(
            "Dumbbell Bench Press",
            "Chest",
            &["Pectoralis Major", "Anterior Deltoid"],
            "Dumbbell",
            Beginner,
        ),
        template(
            "Push-Up",
            "Chest",
            &["Pectoralis Major", "Anterior Deltoid", "Triceps"],
            "Bodyweight",
            Beginner,
        ),
        // Back
        template(
            "Deadlift",
            "Back",
            &["Latissimus Dorsi", "Trapezius", "Erector Spinae"],
            "Barbell",
            Advanced,
        ),
        template(
            "Lat Pulldown",
            "Back",
            &["Latissimus Dorsi", "Rhomboids"],
            "Machine",
            Beginner,
        ),
        template(
            "Dumbbell Row",
            "Back",
            &["Latissimus Dorsi", "Middle Trapezius"],
            "Dumbbell",
            Intermediate,
        ),
        // Legs
        template(
            "Squat",
            "Legs",
            &["Quadriceps", "Glutes", "Hamstrings"],
            "Barbell",
            Intermediate,
        ),
        template(
            "Leg Press",
            "Legs",
            &["Quadriceps", "Glutes"],
            "Machine",
            Beginner,
        ),
        template(
            "Romanian Deadlift",
            "Legs",
            &["Hamstrings", "Glutes"],
            "Barbell",
            Intermediate,
        ),
        // Shoulders
        template(
            "Shoulder Press",
            "Shoulders",
            &["Deltoids", "Triceps"],
            "Dumbbell",
            Beginner,
        ),
        template(
            "Lateral Raise",
            "Shoulders",
            &["Lateral Deltoid"],
            "Dumbbell",
            Beginner,
        ),
        // Arms
        template("Barbell Curl", "Arms", &["Biceps"], "Barbell", Beginner),
        template(
            "Triceps Pushdown",
            "Arms",
            &["Triceps"],
            "Machine",
            Beginner,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_category() {
        let templates = default_exercise_templates();
        assert_eq!(templates.len(), 13);
        for category in CATEGORIES {
            assert!(
                templates.iter().any(|t| t.category == category),
                "no template for {category}"
            );
        }
        // ids must be unique so suggestion dedup works on seeded data
        let mut ids: Vec<_> = templates.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), templates.len());
    }
}
