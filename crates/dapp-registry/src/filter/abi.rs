//! Solidity interfaces the filters decode against

use alloy_sol_types::sol;

sol! {
    /// 0x v2 limit order
    struct ZeroExOrder {
        address makerAddress;
        address takerAddress;
        address feeRecipientAddress;
        address senderAddress;
        uint256 makerAssetAmount;
        uint256 takerAssetAmount;
        uint256 makerFee;
        uint256 takerFee;
        uint256 expirationTimeSeconds;
        uint256 salt;
        bytes makerAssetData;
        bytes takerAssetData;
    }

    /// 0x v4 RFQ order
    struct RfqOrder {
        address makerToken;
        address takerToken;
        uint128 makerAmount;
        uint128 takerAmount;
        address maker;
        address taker;
        address txOrigin;
        bytes32 pool;
        uint64 expiry;
        uint256 salt;
    }

    struct RfqSignature {
        uint8 signatureType;
        uint8 v;
        bytes32 r;
        bytes32 s;
    }

    /// Route payload of the 0x v2 adapter
    struct ZeroExV2Payload {
        ZeroExOrder[] orders;
        bytes[] signatures;
    }

    /// Signature as the 0x v4 adapter payload encodes it
    struct ZeroExV4PayloadSignature {
        uint256 signatureType;
        uint8 v;
        bytes32 r;
        bytes32 s;
    }

    /// Route payload of the 0x v4 adapter
    struct ZeroExV4Payload {
        RfqOrder order;
        ZeroExV4PayloadSignature signature;
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }

    interface IWeth {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
    }

    interface ICurvePool {
        function exchange(int128 i, int128 j, uint256 dx, uint256 min_dy) external payable;
        function exchange_underlying(int128 i, int128 j, uint256 dx, uint256 min_dy) external payable;
    }

    interface ILido {
        function submit(address referral) external payable returns (uint256);
    }

    interface IVat {
        function hope(address usr) external;
    }

    interface IPot {
        function join(uint256 wad) external;
        function exit(uint256 wad) external;
        function drip() external returns (uint256);
    }

    interface IDaiJoin {
        function join(address usr, uint256 wad) external;
        function exit(address usr, uint256 wad) external;
    }

    interface IAaveV2LendingPool {
        function deposit(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function withdraw(address asset, uint256 amount, address to) external returns (uint256);
    }

    interface IAaveV1LendingPool {
        function deposit(address _reserve, uint256 _amount, uint16 _referralCode) external payable;
        function borrow(address _reserve, uint256 _amount, uint256 _interestRateMode, uint16 _referralCode) external;
    }

    interface IAToken {
        function redeem(uint256 _amount) external;
    }

    interface IYearnVault {
        function deposit(uint256 _amount) external;
        function withdraw(uint256 _shares) external;
        function withdrawAll() external;
        function depositETH() external payable;
        function withdrawETH(uint256 _shares) external;
        function withdrawAllETH() external;
    }

    /// Argument-free entry points of v2 vaults, next to the v1 signatures
    interface IYearnV2Vault {
        function deposit() external returns (uint256);
        function withdraw() external returns (uint256);
        function setManagementFee(uint256 fee) external;
    }

    interface IBPool {
        function joinswapExternAmountIn(address tokenIn, uint256 tokenAmountIn, uint256 minPoolAmountOut) external returns (uint256);
        function exitswapExternAmountOut(address tokenOut, uint256 tokenAmountOut, uint256 maxPoolAmountIn) external returns (uint256);
        function exitswapPoolAmountIn(address tokenOut, uint256 poolAmountIn, uint256 minAmountOut) external returns (uint256);
        function joinPool(uint256 poolAmountOut, uint256[] maxAmountsIn) external;
    }

    interface IGroDepositHandler {
        function depositGvt(uint256[] inAmounts, uint256 minAmount, address _referral) external;
        function depositPwrd(uint256[] inAmounts, uint256 minAmount, address _referral) external;
        function referral(address referee) external view returns (address);
    }

    interface IGroWithdrawHandler {
        function withdrawByLPToken(bool pwrd, uint256 lpAmount, uint256[] minAmounts) external;
        function withdrawByStablecoin(bool pwrd, uint256 index, uint256 lpAmount, uint256 minAmount) external;
        function withdrawAllSingle(bool pwrd, uint256 index, uint256 minAmount) external;
        function withdrawAllBalanced(bool pwrd, uint256[] minAmounts) external;
        function withdrawalFee(bool pwrd) external view returns (uint256);
    }

    interface IArgentEnsManager {
        function register(string _label, address _owner, bytes _managerSignature) external;
    }

    interface IZkSync {
        function setAuthPubkeyHash(bytes _pubkeyHash, uint32 _nonce) external;
        function getNoticePeriod() external pure returns (uint256);
    }

    interface ICEther {
        function mint() external payable;
        function redeem(uint256 redeemTokens) external returns (uint256);
        function redeemUnderlying(uint256 redeemAmount) external returns (uint256);
        function borrow(uint256 borrowAmount) external returns (uint256);
        function repayBorrow() external payable;
        function repayBorrowBehalf(address borrower) external payable;
    }

    interface ICToken {
        function mint(uint256 mintAmount) external returns (uint256);
        function redeem(uint256 redeemTokens) external returns (uint256);
        function redeemUnderlying(uint256 redeemAmount) external returns (uint256);
        function borrow(uint256 borrowAmount) external returns (uint256);
        function repayBorrow(uint256 repayAmount) external returns (uint256);
        function repayBorrowBehalf(address borrower, uint256 repayAmount) external returns (uint256);
    }

    interface IUniswapV2Router {
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
        function swapTokensForExactTokens(uint256 amountOut, uint256 amountInMax, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
        function swapExactETHForTokens(uint256 amountOutMin, address[] path, address to, uint256 deadline) external payable returns (uint256[] amounts);
        function swapETHForExactTokens(uint256 amountOut, address[] path, address to, uint256 deadline) external payable returns (uint256[] amounts);
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
        function swapTokensForExactETH(uint256 amountOut, uint256 amountInMax, address[] path, address to, uint256 deadline) external returns (uint256[] amounts);
        function addLiquidity(address tokenA, address tokenB, uint256 amountADesired, uint256 amountBDesired, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);
        function addLiquidityETH(address token, uint256 amountTokenDesired, uint256 amountTokenMin, uint256 amountETHMin, address to, uint256 deadline) external payable returns (uint256 amountToken, uint256 amountETH, uint256 liquidity);
        function removeLiquidity(address tokenA, address tokenB, uint256 liquidity, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB);
        function removeLiquidityETH(address token, uint256 liquidity, uint256 amountTokenMin, uint256 amountETHMin, address to, uint256 deadline) external returns (uint256 amountToken, uint256 amountETH);
    }

    interface IAugustus {
        struct Route {
            address exchange;
            address targetExchange;
            uint256 percent;
            bytes payload;
            uint256 networkFee;
        }

        struct Path {
            address to;
            uint256 totalNetworkFee;
            Route[] routes;
        }

        struct MegaSwapPath {
            uint256 fromAmountPercent;
            Path[] path;
        }

        struct SellData {
            address fromToken;
            uint256 fromAmount;
            uint256 toAmount;
            uint256 expectedAmount;
            address beneficiary;
            string referrer;
            bool useReduxToken;
            Path[] path;
        }

        struct MegaSwapSellData {
            address fromToken;
            uint256 fromAmount;
            uint256 toAmount;
            uint256 expectedAmount;
            address beneficiary;
            string referrer;
            bool useReduxToken;
            MegaSwapPath[] path;
        }

        function multiSwap(SellData data) external payable returns (uint256);
        function megaSwap(MegaSwapSellData data) external payable returns (uint256);
        function simpleSwap(
            address fromToken,
            address toToken,
            uint256 fromAmount,
            uint256 toAmount,
            uint256 expectedAmount,
            address[] callees,
            bytes exchangeData,
            uint256[] startIndexes,
            uint256[] values,
            address beneficiary,
            string referrer,
            bool useReduxToken
        ) external payable returns (uint256);
        function swapOnUniswap(uint256 amountIn, uint256 amountOutMin, address[] path, uint8 referrer) external payable;
        function swapOnUniswapFork(address factory, bytes32 initCode, uint256 amountIn, uint256 amountOutMin, address[] path, uint8 referrer) external payable;
        function withdrawAllWETH(address token) external;
    }

    interface IUniZap {
        function swapExactETHAndAddLiquidity(address _token, uint256 _minLiquidity, address _to, uint256 _deadline) external payable returns (uint256);
        function swapExactTokensAndAddLiquidity(address _tokenA, address _tokenB, uint256 _amountIn, uint256 _minLiquidity, address _to, uint256 _deadline) external returns (uint256);
        function removeLiquidityAndSwapToETH(address _token, uint256 _liquidity, uint256 _minAmount, address _to, uint256 _deadline) external returns (uint256);
        function removeLiquidityAndSwapToToken(address _baseToken, address _targetToken, uint256 _liquidity, uint256 _minAmount, address _to, uint256 _deadline) external returns (uint256);
    }

    interface IUniswapV1Exchange {
        function ethToTokenSwapInput(uint256 min_tokens, uint256 deadline) external payable returns (uint256);
        function tokenToEthSwapInput(uint256 tokens_sold, uint256 min_eth, uint256 deadline) external returns (uint256);
        function tokenToTokenSwapInput(uint256 tokens_sold, uint256 min_tokens_bought, uint256 min_eth_bought, uint256 deadline, address token_addr) external returns (uint256);
    }

    interface IParaswapUniV2Router {
        function swap(uint256 amountIn, uint256 amountOutMin, address[] path) external payable returns (uint256);
    }

    interface IUniswapV3Router {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams params) external payable returns (uint256 amountOut);
    }

    interface IZeroExV2 {
        function marketSellOrdersNoThrow(ZeroExOrder[] orders, uint256 takerAssetFillAmount, bytes[] signatures) external returns (uint256);
    }

    interface IZeroExV4 {
        function fillRfqOrder(RfqOrder order, RfqSignature signature, uint128 takerTokenFillAmount) external payable returns (uint128, uint128);
    }
}
