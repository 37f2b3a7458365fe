use alloy::sol;

// ABI surface of the deployed exchange contracts. These are the bespoke
// deployment's signatures: the router takes no deadline and addLiquidity
// has no minimum amounts.
sol! {
    /// Token factory: mints a new ERC20 with the full supply credited to
    /// the caller.
    #[sol(rpc)]
    interface ITokenFactory {
        function createToken(string name, string symbol, uint256 totalSupply) external returns (address token);
    }

    /// Pair factory: creates trading pairs and enumerates them in creation
    /// order.
    #[sol(rpc)]
    interface IPairFactory {
        function createPair(address tokenA, address tokenB) external returns (address pair);

        /// Number of pairs created so far.
        function allPairsLength() external view returns (uint256);

        /// Pair address at a creation-order index.
        function allPairs(uint256 index) external view returns (address pair);
    }

    /// Exchange router: liquidity provisioning, swaps, and read-only quotes.
    #[sol(rpc)]
    interface IDexRouter {
        function addLiquidity(
            address tokenA,
            address tokenB,
            uint256 amountA,
            uint256 amountB
        ) external;

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to
        ) external returns (uint256[] memory amounts);

        /// Expected output amounts along `path` for a given input amount.
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }

    /// Minimal pair introspection: just the two constituent tokens.
    #[sol(rpc)]
    interface IPair {
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}
