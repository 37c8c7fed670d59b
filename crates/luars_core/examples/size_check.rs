use luars_core::{LuaTable, LuaValue, TableRef, Varargs};
use std::mem::size_of;

fn main() {
    println!("=== Size Check ===");
    println!("LuaValue: {} bytes", size_of::<LuaValue>());
    println!("Varargs: {} bytes", size_of::<Varargs>());
    println!("TableRef: {} bytes", size_of::<TableRef>());
    println!("LuaTable: {} bytes", size_of::<LuaTable>());
}
