use crate::{info, utils::POPULAR_GENRES};

pub fn genres() {
    info!("Suggested genres (any keyword works):");
    for genre in POPULAR_GENRES {
        println!("  {}", genre);
    }
}
