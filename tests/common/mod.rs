//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use titanic_survival::pipeline::{
    ModelingTable, PassengerClass, Port, Sex, Survival, TransformedRecord,
};

/// Rows in the canonical passenger list
pub const FULL_ROWS: usize = 891;

/// Missing ages in the canonical passenger list
pub const MISSING_AGES: usize = 177;

/// Rows with no port of embarkation in the canonical passenger list
pub const MISSING_EMBARKED: [usize; 2] = [61, 829];

/// Header line of the passenger file
pub const HEADER: &str =
    "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked";

/// Build a synthetic passenger list with the shape of the real one.
///
/// Survival depends on sex, class and age with noise, so both model families
/// have signal to find and neither class is perfectly separated. Every
/// fifth row (offset 3) loses its age, up to `MISSING_AGES` of them, and the
/// rows in `MISSING_EMBARKED` lose their port when present.
pub fn create_passenger_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut ids = Vec::with_capacity(rows);
    let mut survived = Vec::with_capacity(rows);
    let mut pclass = Vec::with_capacity(rows);
    let mut names = Vec::with_capacity(rows);
    let mut sexes = Vec::with_capacity(rows);
    let mut ages: Vec<Option<f64>> = Vec::with_capacity(rows);
    let mut sibsp = Vec::with_capacity(rows);
    let mut parch = Vec::with_capacity(rows);
    let mut tickets = Vec::with_capacity(rows);
    let mut fares = Vec::with_capacity(rows);
    let mut cabins: Vec<Option<String>> = Vec::with_capacity(rows);
    let mut embarked: Vec<Option<&str>> = Vec::with_capacity(rows);

    let small_counts = [0i64, 0, 0, 0, 1, 1, 2, 3];
    let mut ages_dropped = 0;

    for i in 0..rows {
        let class: i64 = match rng.gen_range(0..10) {
            0..=1 => 1,
            2..=3 => 2,
            _ => 3,
        };
        let female = rng.gen_bool(0.35);
        let age = (rng.gen_range(1.0..70.0f64) * 2.0).round() / 2.0;

        let fare = match class {
            1 => rng.gen_range(30.0..250.0f64),
            2 => rng.gen_range(10.0..40.0f64),
            _ => rng.gen_range(5.0..25.0f64),
        };

        let eta = 0.8 + if female { 2.4 } else { 0.0 } - 0.9 * (class - 1) as f64 - 0.02 * age;
        let p = 1.0 / (1.0 + (-eta).exp());

        ids.push(i as i64 + 1);
        survived.push(if rng.gen_bool(p) { 1i64 } else { 0 });
        pclass.push(class);
        names.push(format!(
            "Passenger{}, {} Test",
            i + 1,
            if female { "Mrs." } else { "Mr." }
        ));
        sexes.push(if female { "female" } else { "male" });

        if i % 5 == 3 && ages_dropped < MISSING_AGES {
            ages.push(None);
            ages_dropped += 1;
        } else {
            ages.push(Some(age));
        }

        sibsp.push(small_counts[rng.gen_range(0..small_counts.len())]);
        parch.push(small_counts[rng.gen_range(0..small_counts.len())]);
        tickets.push(format!("T{}", 1000 + i));
        fares.push((fare * 100.0).round() / 100.0);

        cabins.push(if class == 1 {
            let deck = ['A', 'B', 'C', 'D', 'E'][rng.gen_range(0..5)];
            Some(format!("{}{}", deck, rng.gen_range(1..130)))
        } else {
            None
        });

        embarked.push(if MISSING_EMBARKED.contains(&i) {
            None
        } else {
            match rng.gen_range(0..10) {
                0..=1 => Some("C"),
                2 => Some("Q"),
                _ => Some("S"),
            }
        });
    }

    df! {
        "PassengerId" => ids,
        "Survived" => survived,
        "Pclass" => pclass,
        "Name" => names,
        "Sex" => sexes,
        "Age" => ages,
        "SibSp" => sibsp,
        "Parch" => parch,
        "Ticket" => tickets,
        "Fare" => fares,
        "Cabin" => cabins,
        "Embarked" => embarked,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("train.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Write the canonical-shaped passenger list to a temporary CSV
pub fn create_passenger_csv() -> (TempDir, PathBuf) {
    let mut df = create_passenger_dataframe(FULL_ROWS, 42);
    create_temp_csv(&mut df)
}

/// Write raw lines to a temporary file with the given name
pub fn create_raw_file(name: &str, lines: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);

    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }

    (temp_dir, path)
}

/// A cleaned record with every field spelled out
#[allow(clippy::too_many_arguments)]
pub fn record(
    survived: Survival,
    pclass: PassengerClass,
    sex: Sex,
    age: f64,
    sibsp: f64,
    parch: f64,
    fare: f64,
    embarked: Port,
) -> TransformedRecord {
    TransformedRecord {
        survived,
        pclass,
        sex,
        age,
        sibsp,
        parch,
        fare,
        embarked,
    }
}

/// A noisy modeling table built directly, skipping load and transform
pub fn create_modeling_table(rows: usize, seed: u64) -> ModelingTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let classes = [
        PassengerClass::First,
        PassengerClass::Second,
        PassengerClass::Third,
    ];
    let ports = [Port::Cherbourg, Port::Queenstown, Port::Southampton];

    (0..rows)
        .map(|_| {
            let pclass = classes[rng.gen_range(0..3)];
            let sex = if rng.gen_bool(0.4) { Sex::Female } else { Sex::Male };
            let age = rng.gen_range(1.0..70.0f64);
            let eta = 0.5
                + if sex == Sex::Female { 2.0 } else { 0.0 }
                - 0.8 * pclass_rank(pclass)
                - 0.015 * age;
            let survived = if rng.gen_bool(1.0 / (1.0 + (-eta).exp())) {
                Survival::Survived
            } else {
                Survival::Died
            };
            record(
                survived,
                pclass,
                sex,
                age,
                (rng.gen_range(0..3) as f64).ln_1p(),
                (rng.gen_range(0..3) as f64).ln_1p(),
                rng.gen_range(5.0..200.0f64).ln_1p(),
                ports[rng.gen_range(0..3)],
            )
        })
        .collect()
}

fn pclass_rank(pclass: PassengerClass) -> f64 {
    match pclass {
        PassengerClass::First => 0.0,
        PassengerClass::Second => 1.0,
        PassengerClass::Third => 2.0,
    }
}
