//! Solidity interfaces of the contracts the client calls
#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy::sol;

sol! {
    /// The constant-exchange contract
    #[sol(rpc)]
    interface ITokenSwap {
        function swap(address _tokenIn, address _tokenOut, uint256 _amountIn, uint256 _minAmountOut) external returns (uint256 amountOut);
        function getAmountOut(address _tokenIn, address _tokenOut, uint256 _amountIn) external view returns (uint256 amountOut);
        function getReserve(address _token) external view returns (uint256 reserve);
        function addLiquidity(address token, uint256 amount) external;
        function removeLiquidity(address token, uint256 amount) external;
    }
}

sol! {
    /// The subset of ERC-20 the client needs
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
    }
}
