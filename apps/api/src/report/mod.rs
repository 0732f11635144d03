// Score Presentation Layer: pure view-model construction over the canonical
// breakdown. Two parent surfaces (full analysis view and slide-over panel)
// embed the same builder; the only UI state is the explicit expand index.

pub mod handlers;
pub mod view;
