//! Writes `sample_survey.csv`: synthetic answers with ratings in the mixed
//! forms seen in spreadsheet exports ("High-9", "7 out of 10", "N/A", ...).

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Render a rating the way a respondent or export tool might have typed it.
fn messy_rating(rng: &mut SimpleRng, rating: f64) -> String {
    let rounded = rating.round().clamp(0.0, 12.0) as i64;
    match rng.next_u64() % 10 {
        0 => "N/A".to_string(),
        1 => String::new(),
        2 if rounded >= 7 => format!("High-{rounded}"),
        2 => format!("Low-{rounded}"),
        3 => format!("{rounded} out of 10"),
        4 => format!("{:.1}", rating.clamp(0.0, 12.0)),
        _ => rounded.to_string(),
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let departments = ["Sales", "Support", "Engineering", "Finance"];
    let comments = ["", "Great team", "Too many meetings", "Need better tools"];

    let output_path = "sample_survey.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating sample CSV")?;
    writer.write_record([
        "Respondent",
        "Department",
        "Satisfaction",
        "Workload",
        "Recommend",
        "Commute",
        "Comments",
    ])?;

    let respondents = 120;
    for id in 1..=respondents {
        // Recommend tracks satisfaction, workload runs against it, commute is
        // unrelated noise.
        let satisfaction = rng.gauss(6.5, 2.0);
        let workload = 11.0 - satisfaction + rng.gauss(0.0, 1.5);
        let recommend = 0.8 * satisfaction + rng.gauss(1.5, 1.0);
        let commute = rng.gauss(5.0, 2.5);

        let record = [
            format!("R{id:03}"),
            rng.pick(&departments).to_string(),
            messy_rating(&mut rng, satisfaction),
            messy_rating(&mut rng, workload),
            messy_rating(&mut rng, recommend),
            messy_rating(&mut rng, commute),
            rng.pick(&comments).to_string(),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {respondents} survey responses to {output_path}");
    Ok(())
}
