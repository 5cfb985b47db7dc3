//! User-facing message strings shared by the service and the client.

pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const EMPTY_EMAIL: &str = "Please enter an email address";
pub const INVALID_CREDENTIAL: &str = "Invalid email or password";
pub const LOGIN_FAILED: &str = "An error occurred during login";
pub const FEDERATED_LOGIN_FAILED: &str = "An error occurred during GitHub sign in";
pub const RESET_SENT: &str = "Password reset email sent! Please check your inbox.";
pub const RESET_FAILED: &str = "Failed to send password reset email. Please try again.";
pub const ALREADY_MEMBER: &str = "This user is already a member of the pool";
pub const CANNOT_REMOVE_OWNER: &str = "Cannot remove the pool owner";
pub const NOT_A_MEMBER: &str = "This user is not a member of the pool";
pub const POOL_NOT_FOUND: &str = "Pool not found";
pub const POOL_LOAD_FAILED: &str = "Failed to load pool data";
pub const POOL_MISSING: &str = "Pool data is missing";
pub const ADD_MEMBER_FAILED: &str = "Failed to add member to the pool";
pub const REMOVE_MEMBER_FAILED: &str = "Failed to remove member from the pool";
pub const NOT_POOL_OWNER: &str = "Only the pool owner can do that";
pub const EMPTY_POOL_NAME: &str = "Please enter a pool name";
pub const EMPTY_COMPONENT_NAME: &str = "Please enter a component name";
pub const POOLS_LOAD_FAILED: &str = "Failed to load your pools";
pub const CREATE_POOL_FAILED: &str = "Failed to create pool";
pub const DELETE_POOL_FAILED: &str = "Failed to delete pool";
pub const COMPONENTS_LOAD_FAILED: &str = "Failed to load components";
pub const CREATE_COMPONENT_FAILED: &str = "Failed to add component";
pub const DELETE_COMPONENT_FAILED: &str = "Failed to delete component";
pub const PASSWORD_UPDATED: &str = "Password updated. You can now sign in.";
pub const SIGN_IN_REQUIRED: &str = "Please sign in to continue";
