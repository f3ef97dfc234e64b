//! Auxiliary power calculator
//!
//! Given a power deficit, a menu of battery types and a fuel line that can
//! only be divided by 2- and 3-outlet splitters, finds battery/ratio
//! assignments covering the deficit and lays out the splitter network that
//! produces those ratios.
//!
//! ```text
//! generate_valid_ratios → search_for_count → best_assignment
//!   → rank_solutions → construct_splitter_network
//! ```

pub mod assignment;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod network;
pub mod ranker;
pub mod ratio;
pub mod search;

pub use assignment::best_assignment;
pub use config::{SearchLimits, SearchParams};
pub use error::CalcError;
pub use models::{
    Assignment, BatteryType, NetworkNode, RankedSolution, Ratio, Solution, SolutionKind,
    SplitterNetwork,
};
pub use network::construct_splitter_network;
pub use ranker::rank_solutions;
pub use ratio::{generate_valid_ratios, get_depth, to_fraction};
pub use search::{search_optimal_combination, search_with_limits};
