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

    /// Uniform integer in `[lo, hi]` inclusive.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.range(0, items.len() as i64 - 1) as usize]
    }
}

const CLUBS: &[&str] = &[
    "Arsenal",
    "Real Madrid",
    "Bayern München",
    "Milan",
    "Ajax",
    "Boca Juniors",
    "Galatasaray",
    "Flamengo",
];

const NATIONS: &[&str] = &[
    "England",
    "Spain",
    "Germany",
    "Italy",
    "Netherlands",
    "Argentina",
    "Türkiye",
    "Brazil",
];

const POSITION_SETS: &[&str] = &[
    "GK",
    "CB",
    "CB, RB",
    "LB, LWB",
    "CDM, CM",
    "CM, CAM",
    "RW, RM",
    "LW, ST",
    "ST",
    "ST, CF",
];

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/players.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let n_players = 400;

    if let Some(parent) = std::path::Path::new(&output_path).parent() {
        std::fs::create_dir_all(parent).context("creating output directory")?;
    }
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "short_name",
        "overall",
        "potential",
        "age",
        "player_positions",
        "club_name",
        "nationality_name",
        "preferred_foot",
        "weak_foot",
        "skill_moves",
        "pace",
        "shooting",
        "passing",
        "dribbling",
        "defending",
        "physic",
        "attacking_crossing",
        "movement_reactions",
        "power_shot_power",
        "value_eur",
        "wage_eur",
    ])?;

    for i in 0..n_players {
        let overall = rng.range(55, 94);
        let age = rng.range(16, 40);
        // Younger players carry more headroom.
        let headroom = ((40 - age).max(0) as f64 * rng.next_f64() * 1.2) as i64;
        let potential = (overall + headroom).min(99);

        // Roughly one in twelve players is an unattached free agent.
        let club = if rng.range(0, 11) == 0 {
            String::new()
        } else {
            (*rng.pick(CLUBS)).to_string()
        };

        // Free agents have no market value; the odd contracted player is
        // missing one too, exercising null handling downstream.
        let value_eur = if club.is_empty() || rng.range(0, 29) == 0 {
            String::new()
        } else {
            let base = (overall as f64 - 50.0).powi(3) * 1_000.0;
            format!("{:.0}", base * (0.5 + rng.next_f64()))
        };
        let wage_eur = if club.is_empty() {
            String::new()
        } else {
            format!("{}", rng.range(500, 250_000))
        };

        let attr = |rng: &mut SimpleRng| {
            (overall + rng.range(-15, 10)).clamp(20, 99).to_string()
        };

        writer.write_record([
            format!("Player_{i:03}"),
            overall.to_string(),
            potential.to_string(),
            age.to_string(),
            (*rng.pick(POSITION_SETS)).to_string(),
            club,
            (*rng.pick(NATIONS)).to_string(),
            if rng.range(0, 3) == 0 { "Left" } else { "Right" }.to_string(),
            rng.range(1, 5).to_string(),
            rng.range(1, 5).to_string(),
            attr(&mut rng),
            attr(&mut rng),
            attr(&mut rng),
            attr(&mut rng),
            attr(&mut rng),
            attr(&mut rng),
            attr(&mut rng),
            attr(&mut rng),
            attr(&mut rng),
            value_eur,
            wage_eur,
        ])?;
    }

    writer.flush()?;
    println!("Wrote {n_players} players to {output_path}");
    Ok(())
}
