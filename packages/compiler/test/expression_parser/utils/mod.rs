/**
 * Test Utilities
 *
 * Helpers shared by the expression parser tests.
 */
pub mod unparser;
