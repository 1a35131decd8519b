//! Default catalog data for first-run seeding.

use serde_json::{json, Value};

/// Default trainer roster, inserted when the collection is empty.
pub fn default_trainers() -> Vec<Value> {
    vec![
        json!({
            "name": "Carlos Titan",
            "role": "Master Trainer",
            "specialties": ["Strength", "Powerlifting"],
            "bio": "Specialist in lifting heavy things. Over 10 years competing in powerlifting.",
            "photo_url": "https://images.unsplash.com/photo-1599058945522-28d584b6f0ff?w=400&q=80",
            "active": true
        }),
        json!({
            "name": "Sofia Zen",
            "role": "Yoga Instructor",
            "specialties": ["Yoga", "Mobility"],
            "bio": "Find your center and improve your flexibility. Certified in Hatha and Vinyasa.",
            "photo_url": "https://images.unsplash.com/photo-1518611012118-696072aa579a?w=400&q=80",
            "active": true
        }),
        json!({
            "name": "Marco Gloves",
            "role": "Boxing Coach",
            "specialties": ["Boxing", "HIIT"],
            "bio": "Technique, speed and endurance. Former amateur boxer passionate about teaching.",
            "photo_url": "https://images.unsplash.com/photo-1583454110551-21f2fa2afe61?w=400&q=80",
            "active": true
        }),
        json!({
            "name": "Laura Burn",
            "role": "HIIT Specialist",
            "specialties": ["HIIT", "Cardio"],
            "bio": "Burn calories and build endurance in record time. Explosive classes.",
            "photo_url": "https://images.unsplash.com/photo-1620188467120-5042ed1eb5da?w=400&q=80",
            "active": true
        }),
        json!({
            "name": "David Core",
            "role": "Functional Trainer",
            "specialties": ["Strength", "Functional"],
            "bio": "Build a strong, useful body for everyday life. Focus on natural movement.",
            "photo_url": "https://images.unsplash.com/photo-1620188467120-5042ed1eb5da?w=400&q=80",
            "active": true
        }),
    ]
}

/// Default plan catalog, inserted when the collection is empty.
pub fn default_plans() -> Vec<Value> {
    vec![
        json!({
            "name": "Basic Plan",
            "description": "Starter access. Ideal for maintenance or occasional technique work. 1 session per month.",
            "price_cents": 5000,
            "included_credits": 1,
            "promotional": false
        }),
        json!({
            "name": "Elite Plan",
            "description": "Full transformation. 4 monthly sessions with 1:1 follow-up, nutrition and metrics.",
            "price_cents": 18000,
            "included_credits": 4,
            "promotional": true
        }),
    ]
}
