/// Data layer: core types, synthetic scenarios, survey I/O.
///
/// Architecture:
/// ```text
///   config params            .csv / .json survey
///        │                          │
///        ▼                          ▼
///   ┌───────────┐             ┌──────────┐
///   │ synthetic │             │  loader  │
///   └───────────┘             └──────────┘
///        │                          │
///        └────────────┬─────────────┘
///                     ▼
///              ┌─────────────┐
///              │    model    │  Grid2, SurveyPoint, Signature
///              └─────────────┘
///                     │
///                     ▼
///              ┌─────────────┐
///              │   export    │  CSV side files
///              └─────────────┘
/// ```

pub mod export;
pub mod loader;
pub mod model;
pub mod synthetic;
