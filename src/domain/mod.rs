//! Value types shared by the list controller and its collaborators.

pub mod page;
