//! Solidity interfaces spoken by the hub and its proxies.

use alloy_sol_types::sol;

sol! {
    /// Hub interface. Every function is reachable on the hub directly and on
    /// any proxy through delegated execution.
    interface IRelayHub {
        /// Emitted for every accepted deposit.
        /// @param receiver Immediate sender of the value, the proxy on the relay path
        /// @param amount Value forwarded to cold storage in wei
        event Deposit(address indexed receiver, uint256 amount);

        /// Replace the cold-storage destination. Revives a killed hub.
        function changeColdAddress(address newCold) external;

        /// Replace the auxiliary logic reached by unknown calls. Zero unsets it.
        function changeImplAddress(address newImpl) external;

        /// Replace the minimum accepted deposit.
        function changeMinInput(uint256 newMin) external;

        /// Clear the cold-storage destination, refusing further deposits.
        function kill() external;

        /// Send the native balance of the executing instance to the sweep target.
        function sweep() external;

        /// Send the token balance of the executing instance to the sweep target.
        function sweepToken(address token) external;

        /// Create the proxy for `salt` and return its address.
        function deployNewInstance(bytes32 salt) external returns (address);

        /// Hub relayed to by the executing instance, zero when running as the hub.
        function detectContext() external view returns (address);

        function coldAddress() external view returns (address);

        function minInput() external view returns (uint256);

        function implAddress() external view returns (address);

        function admin() external view returns (address);

        /// Address `deployNewInstance(salt)` creates the proxy at.
        function computeAddress(bytes32 salt) external view returns (address);
    }

    /// The two ERC-20 capabilities used for sweeping.
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}
