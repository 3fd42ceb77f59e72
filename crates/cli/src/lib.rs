// Library half of the jrecon CLI: report renderers shared by the binary and tests.

pub mod render;
