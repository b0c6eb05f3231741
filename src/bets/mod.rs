//! BetGenerator: five bet-type generators, each a pure filter cascade over
//! the fused distribution, the agreement map, and the relevant odds slice.
//! No generator performs I/O.

pub mod exacta;
pub mod place;
pub mod quinella;
pub mod wide;
pub mod win;
