pub mod helpers;

pub mod badges;
pub mod bytecode;
pub mod media;
pub mod menus;
pub mod properties;
pub mod runtime;
pub mod stages;
